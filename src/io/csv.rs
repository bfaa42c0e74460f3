//! Loads a graph dataset from csv exchange files.
//!
//! A dataset directory holds :
//! - `graphs.csv` : graph_id,label
//! - `nodes.csv` : graph_id,node_id,f0,f1,...  node ids are local to a graph and must cover 0..N-1
//! - `edges.csv` : graph_id,src,dst  with local node ids, repeated lines give parallel edges
//! - `urls.csv` (optional) : graph_id,node_id,url
//!
//! All files have a header line, lines beginning with # are skipped.
//! Graphs are kept in the order of `graphs.csv`.

use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use indexmap::IndexMap;
use ndarray::Array2;

use crate::error::{GnnError, Result};
use crate::graph::{Graph, GraphDataset};

pub const GRAPHS_FILE: &str = "graphs.csv";
pub const NODES_FILE: &str = "nodes.csv";
pub const EDGES_FILE: &str = "edges.csv";
pub const URLS_FILE: &str = "urls.csv";

// what we accumulate for a graph while reading the files
#[derive(Default)]
struct GraphParts {
    label: usize,
    nodes: Vec<(usize, Vec<f32>)>,
    edges: Vec<(usize, usize)>,
    urls: Vec<(usize, String)>,
}

fn parse_field<T: std::str::FromStr>(record: &StringRecord, rank: usize, file: &str) -> Result<T> {
    let field = record
        .get(rank)
        .ok_or_else(|| GnnError::InvalidGraph(format!("{} : missing column {} in {:?}", file, rank, record)))?;
    field
        .parse::<T>()
        .map_err(|_| GnnError::InvalidGraph(format!("{} : cannot parse {:?} in {:?}", file, field, record)))
}

fn reader_for(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    let reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .comment(Some(b'#'))
        .flexible(false)
        .from_path(path)
        .map_err(|e| {
            log::error!("could not open {} : {}", path.display(), e);
            e
        })?;
    Ok(reader)
}

fn parts_of<'a>(parts: &'a mut IndexMap<u64, GraphParts>, graph_id: u64, file: &str) -> Result<&'a mut GraphParts> {
    parts
        .get_mut(&graph_id)
        .ok_or_else(|| GnnError::InvalidGraph(format!("{} : graph id {} not declared in {}", file, graph_id, GRAPHS_FILE)))
}

/// reads the dataset files of dir
pub fn load_dataset<P: AsRef<Path>>(dir: P) -> Result<GraphDataset> {
    let dir = dir.as_ref();
    log::info!("loading dataset from {}", dir.display());
    //
    let mut parts = IndexMap::<u64, GraphParts>::new();
    let mut reader = reader_for(&dir.join(GRAPHS_FILE))?;
    for result in reader.records() {
        let record = result?;
        let graph_id: u64 = parse_field(&record, 0, GRAPHS_FILE)?;
        let label: usize = parse_field(&record, 1, GRAPHS_FILE)?;
        if parts.contains_key(&graph_id) {
            return Err(GnnError::InvalidGraph(format!("{} : graph id {} declared twice", GRAPHS_FILE, graph_id)));
        }
        parts.insert(graph_id, GraphParts { label, ..Default::default() });
    }
    if parts.is_empty() {
        return Err(GnnError::EmptyDataset(format!("no graph in {}", dir.join(GRAPHS_FILE).display())));
    }
    //
    let mut reader = reader_for(&dir.join(NODES_FILE))?;
    for result in reader.records() {
        let record = result?;
        let graph_id: u64 = parse_field(&record, 0, NODES_FILE)?;
        let node_id: usize = parse_field(&record, 1, NODES_FILE)?;
        let mut features = Vec::<f32>::with_capacity(record.len().saturating_sub(2));
        for rank in 2..record.len() {
            features.push(parse_field(&record, rank, NODES_FILE)?);
        }
        parts_of(&mut parts, graph_id, NODES_FILE)?.nodes.push((node_id, features));
    }
    //
    let mut reader = reader_for(&dir.join(EDGES_FILE))?;
    for result in reader.records() {
        let record = result?;
        let graph_id: u64 = parse_field(&record, 0, EDGES_FILE)?;
        let src: usize = parse_field(&record, 1, EDGES_FILE)?;
        let dst: usize = parse_field(&record, 2, EDGES_FILE)?;
        parts_of(&mut parts, graph_id, EDGES_FILE)?.edges.push((src, dst));
    }
    //
    let urls_path = dir.join(URLS_FILE);
    if urls_path.exists() {
        let mut reader = reader_for(&urls_path)?;
        for result in reader.records() {
            let record = result?;
            let graph_id: u64 = parse_field(&record, 0, URLS_FILE)?;
            let node_id: usize = parse_field(&record, 1, URLS_FILE)?;
            let url: String = parse_field(&record, 2, URLS_FILE)?;
            parts_of(&mut parts, graph_id, URLS_FILE)?.urls.push((node_id, url));
        }
    }
    //
    let mut graphs = Vec::<Graph>::with_capacity(parts.len());
    let mut max_label = 0usize;
    for (graph_id, graph_parts) in parts {
        max_label = max_label.max(graph_parts.label);
        graphs.push(assemble(graph_id, graph_parts)?);
    }
    let nb_edges: usize = graphs.iter().map(|g| g.get_nb_edges()).sum();
    log::info!("read {} graphs, {} edges", graphs.len(), nb_edges);
    GraphDataset::new(graphs, (max_label + 1).max(2))
} // end of load_dataset

fn assemble(graph_id: u64, mut parts: GraphParts) -> Result<Graph> {
    if parts.nodes.is_empty() {
        return Err(GnnError::InvalidGraph(format!("graph {} has no node", graph_id)));
    }
    parts.nodes.sort_by_key(|(node_id, _)| *node_id);
    let nb_nodes = parts.nodes.len();
    let nb_features = parts.nodes[0].1.len();
    let mut values = Vec::<f32>::with_capacity(nb_nodes * nb_features);
    for (rank, (node_id, features)) in parts.nodes.iter().enumerate() {
        if *node_id != rank {
            return Err(GnnError::InvalidGraph(format!(
                "graph {} : node ids must be 0..{} without gap or repetition",
                graph_id, nb_nodes
            )));
        }
        values.extend_from_slice(features);
    }
    let features = Array2::from_shape_vec((nb_nodes, nb_features), values)
        .map_err(|e| GnnError::InvalidGraph(format!("graph {} : {}", graph_id, e)))?;
    let graph = Graph::new(features, parts.edges, parts.label)?;
    if parts.urls.is_empty() {
        return Ok(graph);
    }
    // nodes without url are error nodes
    let mut urls = vec![String::new(); nb_nodes];
    for (node_id, url) in parts.urls {
        if node_id >= nb_nodes {
            return Err(GnnError::InvalidGraph(format!("graph {} : url for unknown node {}", graph_id, node_id)));
        }
        urls[node_id] = url;
    }
    graph.with_urls(urls)
} // end of assemble

// end of mod tests
