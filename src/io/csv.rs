//! Construct an attributed graph from two csv files, read ground truth labels and dump scores.
//!
//! Files have no header, lines beginning with # are skipped.
//! - feature file : one row per node `node_id, f_1, ..., f_d`. Node ranks follow the order of this file.
//! - edge file : one row per edge `src, dst` possibly followed by other fields (weights...) which are ignored.
//! - label file : one row per node `node_id, 0|1`.


use anyhow::{anyhow};
use serde::{Serialize};

use std::fs::OpenOptions;
use std::io::{BufReader, BufWriter};
use std::path::{Path};

use csv::{ReaderBuilder, WriterBuilder};
use indexmap::IndexSet;
use ndarray::{Array1, Array2};

use crate::graph::AttributedGraph;


// open a reader on a headerless csv with comment lines
fn open_reader(filepath : &Path, delim : u8) -> Result<csv::Reader<BufReader<std::fs::File>>, anyhow::Error> {
    let fileres = OpenOptions::new().read(true).open(filepath);
    if fileres.is_err() {
        log::error!("could not open file {:?}", filepath.as_os_str());
        return Err(anyhow!("could not open file {}", filepath.display()));
    }
    let bufreader = BufReader::new(fileres?);
    let rdr = ReaderBuilder::new().delimiter(delim).flexible(true).has_headers(false)
            .comment(Some(b'#')).trim(csv::Trim::All).from_reader(bufreader);
    Ok(rdr)
} // end of open_reader


fn parse_node(field : Option<&str>, nb_record : usize) -> Result<usize, anyhow::Error> {
    match field.map(|f| f.parse::<usize>()) {
        Some(Ok(node)) => Ok(node),
        _ => Err(anyhow!("error decoding node id of record {}", nb_record)),
    }
}



/// Loads features then edges. Returns the graph and the indexation mapping node ranks to node ids found in files.
pub fn load_graph(edge_path : &Path, feature_path : &Path, delim : u8) -> Result<(AttributedGraph, IndexSet<usize>), anyhow::Error> {
    //
    // features first, they define nodes
    //
    let mut rdr = open_reader(feature_path, delim)?;
    let mut nodeindex = IndexSet::<usize>::new();
    let mut values = Vec::<f64>::new();
    let mut nb_fields = 0;
    let mut nb_record = 0;
    for result in rdr.records() {
        let record = result?;
        nb_record += 1;
        if nb_record == 1 {
            nb_fields = record.len();
            if nb_fields < 2 {
                return Err(anyhow!("feature file needs a node id and at least one feature"));
            }
        }
        if record.len() != nb_fields {
            log::error!("non constant number of fields at record {} first record has {}", nb_record, nb_fields);
            return Err(anyhow!("non constant number of fields at record {} first record has {}", nb_record, nb_fields));
        }
        let node = parse_node(record.get(0), nb_record)?;
        let (_, inserted) = nodeindex.insert_full(node);
        if !inserted {
            return Err(anyhow!("node {} has two feature rows", node));
        }
        for j in 1..nb_fields {
            match record.get(j).map(|f| f.parse::<f64>()) {
                Some(Ok(v)) => values.push(v),
                _ => { return Err(anyhow!("error decoding field {} of record {}", j + 1, nb_record)); },
            }
        }
    }
    if nodeindex.is_empty() {
        return Err(anyhow!("no node in feature file {}", feature_path.display()));
    }
    let features = Array2::from_shape_vec((nodeindex.len(), nb_fields - 1), values)?;
    log::info!("load_graph read {} nodes with {} features", features.nrows(), features.ncols());
    //
    // now edges, given with node ids
    //
    let mut rdr = open_reader(edge_path, delim)?;
    let mut edges = Vec::<(usize,usize)>::new();
    nb_record = 0;
    for result in rdr.records() {
        let record = result?;
        nb_record += 1;
        if record.len() < 2 {
            return Err(anyhow!("edge record {} has less than 2 fields", nb_record));
        }
        let mut ranks = [0usize; 2];
        for (k, rank) in ranks.iter_mut().enumerate() {
            let node = parse_node(record.get(k), nb_record)?;
            *rank = match nodeindex.get_index_of(&node) {
                Some(rank) => rank,
                None => {
                    log::error!("edge record {} references node {} which has no features", nb_record, node);
                    return Err(anyhow!("edge references unknown node {}", node));
                },
            };
        }
        edges.push((ranks[0], ranks[1]));
    }
    log::info!("load_graph read {} edge records", edges.len());
    let graph = AttributedGraph::from_edges(features, &edges)?;
    Ok((graph, nodeindex))
} // end of load_graph



/// Reads labels (1 for outlier) and orders them by node rank. Nodes absent from the file are inliers.
pub fn load_labels(filepath : &Path, delim : u8, nodeindex : &IndexSet<usize>) -> Result<Vec<bool>, anyhow::Error> {
    let mut rdr = open_reader(filepath, delim)?;
    let mut labels = vec![false; nodeindex.len()];
    let mut nb_record = 0;
    for result in rdr.records() {
        let record = result?;
        nb_record += 1;
        if record.len() < 2 {
            return Err(anyhow!("label record {} has less than 2 fields", nb_record));
        }
        let node = parse_node(record.get(0), nb_record)?;
        let rank = match nodeindex.get_index_of(&node) {
            Some(rank) => rank,
            None => { return Err(anyhow!("label for unknown node {}", node)); },
        };
        labels[rank] = match record.get(1).map(|f| f.parse::<u8>()) {
            Some(Ok(0)) => false,
            Some(Ok(1)) => true,
            _ => { return Err(anyhow!("label of record {} must be 0 or 1", nb_record)); },
        };
    }
    if nb_record < nodeindex.len() {
        log::warn!("load_labels : {} labels for {} nodes, missing ones set to inlier", nb_record, nodeindex.len());
    }
    Ok(labels)
} // end of load_labels



#[derive(Serialize)]
struct ScoreRecord {
    node_id : usize,
    score : f64,
    outlier : u8,
}


/// Writes a csv with header node_id,score,outlier. Rows follow node ranks.
pub fn dump_scores(filepath : &Path, nodeindex : &IndexSet<usize>, scores : &Array1<f64>, labels : &[bool]) -> Result<(), anyhow::Error> {
    if scores.len() != nodeindex.len() || labels.len() != nodeindex.len() {
        return Err(anyhow!("dump_scores : {} nodes, {} scores, {} labels", nodeindex.len(), scores.len(), labels.len()));
    }
    let fileres = OpenOptions::new().write(true).create(true).truncate(true).open(filepath);
    if fileres.is_err() {
        log::error!("dump_scores could not open file {:?}", filepath.as_os_str());
        return Err(anyhow!("dump_scores could not open file {}", filepath.display()));
    }
    let bufwriter = BufWriter::new(fileres?);
    let mut wtr = WriterBuilder::new().has_headers(true).from_writer(bufwriter);
    for (rank, node_id) in nodeindex.iter().enumerate() {
        wtr.serialize(ScoreRecord{node_id : *node_id, score : scores[rank], outlier : labels[rank] as u8})?;
    }
    wtr.flush()?;
    log::info!("dump_scores wrote {} records in {:?}", nodeindex.len(), filepath);
    Ok(())
} // end of dump_scores



#[cfg(test)]
mod tests {

    use super::*;
    use std::io::Write;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn write_tmp(name : &str, content : &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("graphod_{}_{}", std::process::id(), name));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_graph() {
        log_init_test();
        //
        let features = write_tmp("feat.csv", "# id f1 f2\n10,1.,2.\n20,0.5,0.\n30,-1.,3.\n");
        let edges = write_tmp("edges.csv", "10,20,1.\n30,20,2.\n20,10,1.\n");
        let (graph, nodeindex) = load_graph(&edges, &features, b',').unwrap();
        assert_eq!(nodeindex.iter().cloned().collect::<Vec<usize>>(), vec![10, 20, 30]);
        assert_eq!(graph.get_nb_nodes(), 3);
        assert_eq!(graph.get_nb_features(), 2);
        assert_eq!(graph.get_nb_edges(), 2);
        assert!(graph.has_edge(0, 1) && graph.has_edge(1, 2) && !graph.has_edge(0, 2));
        assert_eq!(graph.get_node_features(2).to_vec(), vec![-1., 3.]);
        //
        let labels = write_tmp("labels.csv", "30,1\n10,0\n");
        assert_eq!(load_labels(&labels, b',', &nodeindex).unwrap(), vec![false, false, true]);
        //
        let out = std::env::temp_dir().join(format!("graphod_{}_scores.csv", std::process::id()));
        dump_scores(&out, &nodeindex, &ndarray::arr1(&[0.1, 0.2, 0.9]), &[false, false, true]).unwrap();
        let content = std::fs::read_to_string(&out).unwrap();
        let lines : Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "node_id,score,outlier");
        assert_eq!(lines[3], "30,0.9,1");
    } // end of test_load_graph


    #[test]
    fn test_load_errors() {
        log_init_test();
        //
        let features = write_tmp("feat_err.csv", "1,1.,2.\n2,0.5\n");
        let edges = write_tmp("edges_err.csv", "1,2\n");
        assert!(load_graph(&edges, &features, b',').is_err());
        let features = write_tmp("feat_ok.csv", "1 1. 2.\n2 0.5 0.\n");
        let edges = write_tmp("edges_unknown.csv", "1 3\n");
        assert!(load_graph(&edges, &features, b' ').is_err());
        let missing = std::path::Path::new("/nonexistent/graphod/edges.csv");
        assert!(load_graph(missing, &features, b' ').is_err());
    } // end of test_load_errors
}
