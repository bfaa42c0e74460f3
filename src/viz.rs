//! Graphviz export of a single graph, for manual inspection.
//!
//! Node 0 is the root page. Nodes are coloured by their url : root, same domain as the root,
//! other domain, or error page (empty url). Parallel edges are merged into one edge labelled with its multiplicity.
//! Training never depends on this module.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use indexmap::IndexMap;

use crate::error::Result;
use crate::graph::Graph;

pub const ROOT_COLOR: &str = "#0096FF";
pub const DOMAIN_COLOR: &str = "#73FCD6";
pub const OUT_DOMAIN_COLOR: &str = "#FFD479";
pub const ERROR_COLOR: &str = "#FF7E79";

/// host part of an url without a leading www.
pub fn extract_domain(url: &str) -> &str {
    let without_scheme = match url.find("://") {
        Some(pos) => &url[pos + 3..],
        None => url,
    };
    let end = without_scheme.find(|c: char| matches!(c, '/' | ':' | '?' | '#')).unwrap_or(without_scheme.len());
    let host = &without_scheme[..end];
    host.strip_prefix("www.").unwrap_or(host)
}

fn node_color(node: usize, url: Option<&str>, domain: &str) -> &'static str {
    if node == 0 {
        return ROOT_COLOR;
    }
    match url {
        Some("") => ERROR_COLOR,
        Some(url) if !domain.is_empty() && !extract_domain(url).ends_with(domain) => OUT_DOMAIN_COLOR,
        _ => DOMAIN_COLOR,
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// number of occurrences of each directed edge, in order of first occurrence
pub fn edge_multiplicities(graph: &Graph) -> IndexMap<(usize, usize), usize> {
    let mut counts = IndexMap::<(usize, usize), usize>::new();
    for edge in graph.get_edges() {
        *counts.entry(*edge).or_insert(0) += 1;
    }
    counts
}

/// writes graph as a DOT document in path
pub fn write_dot<P: AsRef<Path>>(graph: &Graph, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = OpenOptions::new().write(true).create(true).truncate(true).open(path)?;
    let mut out = BufWriter::new(file);
    //
    let urls = graph.get_urls();
    let root_url = urls.and_then(|u| u.first()).map(|s| s.as_str()).unwrap_or("");
    let domain = extract_domain(root_url);
    writeln!(out, "digraph phishing_graph {{")?;
    writeln!(
        out,
        "  comment=\"is_phishing={} url={} nb_edges={}\";",
        graph.is_phishing(),
        escape(root_url),
        graph.get_nb_edges()
    )?;
    writeln!(out, "  node [shape=circle, style=filled, label=\"\", width=0.3];")?;
    for node in 0..graph.get_nb_nodes() {
        let url = urls.map(|u| u[node].as_str());
        let color = node_color(node, url, domain);
        writeln!(
            out,
            "  {} [fillcolor=\"{}\", tooltip=\"{}\"];",
            node,
            color,
            escape(url.unwrap_or(""))
        )?;
    }
    for ((src, dst), count) in edge_multiplicities(graph) {
        if count > 1 {
            writeln!(out, "  {} -> {} [label=\"{}\"];", src, dst, count)?;
        } else {
            writeln!(out, "  {} -> {};", src, dst)?;
        }
    }
    writeln!(out, "}}")?;
    out.flush()?;
    log::debug!("graph with {} nodes dumped in {}", graph.get_nb_nodes(), path.display());
    Ok(())
} // end of write_dot

#[cfg(test)]
mod tests {

    use super::*;
    use ndarray::Array2;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn domain_of_urls() {
        log_init_test();
        assert_eq!(extract_domain("https://www.paypal.com/signin?x=1"), "paypal.com");
        assert_eq!(extract_domain("http://login.example.org:8080/a"), "login.example.org");
        assert_eq!(extract_domain("example.net"), "example.net");
        assert_eq!(extract_domain(""), "");
    }

    #[test]
    fn dot_colours_and_multiplicities() {
        log_init_test();
        let urls = vec![
            String::from("https://www.shop.com/"),
            String::from("https://shop.com/cart"),
            String::from("https://tracker.net/p"),
            String::new(),
        ];
        let graph = Graph::new(Array2::zeros((4, 1)), vec![(0, 1), (0, 1), (0, 1), (0, 2), (2, 3)], 1)
            .unwrap()
            .with_urls(urls)
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.dot");
        write_dot(&graph, &path).unwrap();
        let dot = std::fs::read_to_string(&path).unwrap();
        assert!(dot.starts_with("digraph"));
        assert!(dot.contains("is_phishing=true"));
        assert!(dot.contains(&format!("0 [fillcolor=\"{}\"", ROOT_COLOR)));
        assert!(dot.contains(&format!("1 [fillcolor=\"{}\"", DOMAIN_COLOR)));
        assert!(dot.contains(&format!("2 [fillcolor=\"{}\"", OUT_DOMAIN_COLOR)));
        assert!(dot.contains(&format!("3 [fillcolor=\"{}\"", ERROR_COLOR)));
        assert!(dot.contains("0 -> 1 [label=\"3\"];"));
        assert!(dot.contains("0 -> 2;"));
        assert_eq!(edge_multiplicities(&graph).len(), 3);
    }
} // end of mod tests
