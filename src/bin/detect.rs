//! an executable for detecting outlier nodes in an attributed graph
//! example usage:
//! detect --edges "cora_edges.csv" --features "cora_features.csv" --labels "cora_labels.csv" gae --hidden 64 --layers 4 --dropout 0.1
//! detect --edges "cora_edges.csv" --features "cora_features.csv" gae --structure --sigmoid
//! detect --edges "cora_edges.csv" --features "cora_features.csv" --out "scores.csv" --epochs 100 cola --subgraph 4 --batch 300 --rounds 100 --readout max
//!
//!  gae or cola are different detectors see related docs.
//!  Scores are dumped in a csv file (default scores.csv) with header node_id,score,outlier.


use anyhow::{anyhow};
use clap::{Arg, ArgMatches, Command, arg};

use std::path::Path;

use graphod::prelude::*;



// parse an optional value, keeping default if absent
fn parse_value<T : std::str::FromStr>(matches : &ArgMatches, name : &str, default : T) -> Result<T, anyhow::Error> {
    match matches.value_of(name) {
        Some(str) => {
            match str.parse::<T>() {
                Ok(val) => Ok(val),
                _       => {
                    log::error!("could not parse argument {}, got {}", name, str);
                    Err(anyhow!("could not parse argument {}", name))
                },
            }
        },
        None => Ok(default),
    }
} // end of parse_value


fn parse_detector_args(matches : &ArgMatches) -> Result<DetectorParams, anyhow::Error> {
    let default = DetectorParams::default();
    let epochs = parse_value(matches, "epochs", default.get_epochs())?;
    let lr = parse_value(matches, "lr", default.get_lr())?;
    let weight_decay = parse_value(matches, "decay", default.get_weight_decay())?;
    let contamination = parse_value(matches, "contamination", default.get_contamination())?;
    let seed = parse_value(matches, "seed", default.get_seed())?;
    let params = DetectorParams::new(epochs, lr, weight_decay, contamination, seed);
    params.check()?;
    Ok(params)
} // end of parse_detector_args


fn parse_gae_args(matches : &ArgMatches) -> Result<GaeParams, anyhow::Error> {
    log::debug!("in parse_gae_args");
    let default = GaeParams::default();
    let hidden_dim = parse_value(matches, "hidden", default.get_hidden_dim())?;
    let nb_layers = parse_value(matches, "layers", default.get_nb_layers())?;
    let dropout = parse_value(matches, "dropout", default.get_dropout())?;
    let recon_s = matches.is_present("structure");
    let sigmoid_s = matches.is_present("sigmoid");
    let params = GaeParams::new(hidden_dim, nb_layers, dropout, recon_s, sigmoid_s);
    params.check()?;
    Ok(params)
} // end of parse_gae_args


fn parse_cola_args(matches : &ArgMatches) -> Result<ColaParams, anyhow::Error> {
    log::debug!("in parse_cola_args");
    let default = ColaParams::default();
    let hidden_dim = parse_value(matches, "hidden", default.get_hidden_dim())?;
    let batch_size = parse_value(matches, "batch", default.get_batch_size())?;
    let negative_ratio = parse_value(matches, "negatives", default.get_negative_ratio())?;
    let test_rounds = parse_value(matches, "rounds", default.get_test_rounds())?;
    let walk_default = default.get_walk_params();
    let subgraph_size = parse_value(matches, "subgraph", walk_default.get_subgraph_size())?;
    let restart_proba = parse_value(matches, "restart", walk_default.get_restart_proba())?;
    let readout = parse_value(matches, "readout", default.get_readout())?;
    let walk = WalkParams::new(subgraph_size, restart_proba, walk_default.get_max_retries());
    let params = ColaParams::new(hidden_dim, batch_size, negative_ratio, test_rounds, walk).with_readout(readout);
    params.check()?;
    Ok(params)
} // end of parse_cola_args



pub fn main() {
    //
    let _ = env_logger::builder().try_init();
    log::info!("logger initialized");
    //
    let matches = Command::new("detect")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(Arg::new("edges")
            .long("edges")
            .takes_value(true)
            .required(true)
            .help("csv file of edges : src, dst"))
        .arg(Arg::new("features")
            .long("features")
            .takes_value(true)
            .required(true)
            .help("csv file of features : node_id, f_1, ..., f_d"))
        .arg(Arg::new("labels")
            .long("labels")
            .takes_value(true)
            .required(false)
            .help("optional csv file of ground truth : node_id, 0|1"))
        .arg(Arg::new("delim")
            .long("delim")
            .takes_value(true)
            .required(false)
            .help("csv delimiter, default ','"))
        .arg(Arg::new("out")
            .long("out")
            .takes_value(true)
            .required(false)
            .help("output csv file, default scores.csv"))
        .args(&[
            arg!(--epochs [epochs] "number of training epochs"),
            arg!(--lr [lr] "learning rate"),
            arg!(--decay [decay] "weight decay"),
            arg!(--contamination [contamination] "expected proportion of outliers in (0, 0.5]"),
            arg!(--seed [seed] "seed of random generators"),
        ])
        .subcommand(Command::new("gae")
            .args(&[
                arg!(--hidden [hidden] "dimension of embedding"),
                arg!(--layers [layers] "total number of graph convolutions, encoder and decoder"),
                arg!(--dropout [dropout] "dropout probability of hidden units in training"),
            ])
            .arg(Arg::new("structure")
                .long("structure")
                .help("reconstruct the adjacency instead of the features"))
            .arg(Arg::new("sigmoid")
                .long("sigmoid")
                .help("with --structure, apply a sigmoid to the reconstructed adjacency"))
        )
        .subcommand(Command::new("cola")
            .args(&[
                arg!(--hidden [hidden] "dimension of embedding"),
                arg!(--subgraph [subgraph] "number of nodes of sampled subgraphs, target included"),
                arg!(--batch [batch] "minibatch size, 0 for full graph, at least 2 otherwise"),
                arg!(--negatives [negatives] "number of negative pairs by positive pair"),
                arg!(--rounds [rounds] "number of scoring rounds"),
                arg!(--restart [restart] "restart probability of random walks, in [0, 1]"),
                arg!(--readout [readout] "subgraph readout : avg, max, min or weighted_sum"),
            ])
        )
    .get_matches();

    // decode args

    let edge_file = matches.value_of("edges").unwrap_or("").to_string();
    let feature_file = matches.value_of("features").unwrap_or("").to_string();
    let out_file = matches.value_of("out").unwrap_or("scores.csv").to_string();
    let delim = match matches.value_of("delim") {
        Some(str) if str.len() == 1 => str.as_bytes()[0],
        Some("\\t") => b'\t',
        Some(str) => {
            log::error!("delimiter must be a single character, got {}", str);
            std::process::exit(1);
        },
        None => b',',
    };
    let params = match parse_detector_args(&matches) {
        Ok(params) => params,
        Err(e) => {
            log::error!("error : {:?}", e);
            std::process::exit(1);
        },
    };
    //
    let mut detector : Box<dyn DetectorT> = match matches.subcommand() {
        Some(("gae", sub_m)) => {
            log::debug!("got gae mode");
            match parse_gae_args(sub_m) {
                Ok(gae_params) => Box::new(Gae::new(params, gae_params)),
                Err(e) => {
                    log::error!("error : {:?}", e);
                    std::process::exit(1);
                },
            }
        },
        Some(("cola", sub_m)) => {
            log::debug!("got cola mode");
            match parse_cola_args(sub_m) {
                Ok(cola_params) => Box::new(Cola::new(params, cola_params)),
                Err(e) => {
                    log::error!("error : {:?}", e);
                    std::process::exit(1);
                },
            }
        },
        _  => {
            log::error!("expected subcommand gae or cola");
            std::process::exit(1);
        }
    };  // end match subcommand
    //
    log::info!("loading edges from {:?}, features from {:?}", edge_file, feature_file);
    let (graph, nodeindex) = match load_graph(Path::new(&edge_file), Path::new(&feature_file), delim) {
        Ok(loaded) => loaded,
        Err(e) => {
            log::error!("error : {:?}", e);
            log::error!("detect failed in load_graph");
            std::process::exit(1);
        },
    };
    //
    if let Err(e) = detector.fit(&graph) {
        log::error!("error : {:?}", e);
        log::error!("detector fit failed");
        std::process::exit(1);
    }
    let fitted = match detector.get_fitted() {
        Some(fitted) => fitted,
        None => {
            log::error!("detector has no scores after fit");
            std::process::exit(1);
        },
    };
    let (min, max) = fitted.get_range();
    log::info!("nb nodes : {}, nb outliers : {}, threshold : {:.5e}, score range : [{:.5e}, {:.5e}]",
            graph.get_nb_nodes(), fitted.get_nb_outliers(), fitted.threshold, min, max);
    if let Some(last) = detector.get_loss_history().last() {
        log::info!("last epoch loss : {:.5e}", last);
    }
    //
    if let Err(e) = dump_scores(Path::new(&out_file), &nodeindex, &fitted.decision_scores, &fitted.labels) {
        log::error!("error : {:?}", e);
        std::process::exit(1);
    }
    //
    if let Some(label_file) = matches.value_of("labels") {
        let labels = match load_labels(Path::new(label_file), delim, &nodeindex) {
            Ok(labels) => labels,
            Err(e) => {
                log::error!("error : {:?}", e);
                std::process::exit(1);
            },
        };
        let scores = fitted.decision_scores.to_vec();
        match (roc_auc(&labels, &scores), average_precision(&labels, &scores)) {
            (Ok(auc), Ok(ap)) => {
                log::info!("roc auc : {:.4}, average precision : {:.4}", auc, ap);
                println!("roc auc : {:.4}, average precision : {:.4}", auc, ap);
            },
            (auc, ap) => {
                log::error!("could not evaluate scores : {:?} {:?}", auc.err(), ap.err());
            },
        }
        if let Ok(recall) = recall_at_k(&labels, &scores, None) {
            log::info!("recall at k (k = nb of true outliers) : {:.4}", recall);
        }
    }
}  // end of main
