use std::collections::BTreeMap;
use std::env;
use std::io::Write;

use crustyhash::config::{parse_replicas, HashAlgorithm, RingConfig};
use crustyhash::error::Result;
use crustyhash::ConsistentMap;
use log::info;
use rand::distributions::{Alphanumeric, DistString};

fn load_config() -> Result<RingConfig> {
    let mut config = RingConfig::default();

    if let Ok(replicas) = env::var("RING_REPLICAS") {
        config.replicas = parse_replicas(&replicas)?;
    }
    if let Some(replicas) = env::args().nth(1) {
        config.replicas = parse_replicas(&replicas)?;
    }
    if let Ok(hash) = env::var("RING_HASH") {
        config.hash = hash.parse::<HashAlgorithm>()?;
    }

    Ok(config)
}

fn spread(ring: &ConsistentMap<String>, samples: usize) -> Result<BTreeMap<String, usize>> {
    let mut rng = rand::thread_rng();
    let mut counts = BTreeMap::new();
    for _ in 0..samples {
        let key = Alphanumeric.sample_string(&mut rng, 16);
        if let Some(node) = ring.get_node(&key)? {
            *counts.entry(node).or_insert(0) += 1;
        }
    }
    Ok(counts)
}

fn main() -> Result<()> {
    env_logger::init();

    let config = load_config()?;
    info!(
        "Starting ring with {} replicas per node, hash {}",
        config.replicas, config.hash
    );
    let ring: ConsistentMap<String> = ConsistentMap::from_config(&config);

    println!("Enter ring command (Add, Remove, Nodes, Node, Set, Get, Delete or Spread).\n  Type exit to quit.");

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        if std::io::stdin().read_line(&mut input)? == 0 {
            return Ok(());
        }

        let words = input.split_whitespace().collect::<Vec<&str>>();
        let Some(command) = words.first() else {
            continue;
        };
        let operation = command.to_uppercase();

        match &operation[..] {
            "ADD" => {
                if words.len() < 2 {
                    println!("You must provide a node for ADD command.");
                    continue;
                }
                ring.add_node(words[1])?;
                println!("Added node {} ({} positions on ring)", words[1], ring.len()?);
            }
            "REMOVE" => {
                if words.len() < 2 {
                    println!("You must provide a node for REMOVE command.");
                    continue;
                }
                ring.remove_node(words[1])?;
                println!("Removed node {} ({} positions on ring)", words[1], ring.len()?);
            }
            "NODES" => {
                let nodes = ring.nodes()?;
                if nodes.is_empty() {
                    println!("Ring is empty");
                } else {
                    println!("Nodes: {}", nodes.join(", "));
                }
            }
            "NODE" => {
                if words.len() < 2 {
                    println!("You must provide a key for NODE command.");
                    continue;
                }
                match ring.get_node(words[1])? {
                    Some(node) => println!("Key {} is owned by {}", words[1], node),
                    None => println!("Ring is empty"),
                }
            }
            "SET" => {
                if words.len() < 3 {
                    println!("You must provide key and value for SET command.");
                    continue;
                }
                let key = words[1];
                let value = words[2..].join(" ");
                let previous = ring.get_key(key)?;
                if !ring.add_key(key, value.clone())? {
                    println!("Ring is empty, value was not stored");
                    continue;
                }
                match previous {
                    Some(prev) => println!("Previous value was: {}, inserting: {}", prev, value),
                    None => println!("Inserting new pair ({}, {})", key, value),
                }
            }
            "GET" => {
                if words.len() < 2 {
                    println!("You must provide a key for GET command.");
                    continue;
                }
                match ring.get_key(words[1])? {
                    Some(value) => println!("Value is: {}", value),
                    None => println!("Key not present"),
                }
            }
            "DELETE" => {
                if words.len() < 2 {
                    println!("You must provide a key for DELETE command.");
                    continue;
                }
                match ring.remove_key(words[1])? {
                    Some(prev) => println!("Deleting: ({}, {})", words[1], prev),
                    None => println!("Key not present"),
                }
            }
            "SPREAD" => {
                let samples = match words.get(1).map(|n| n.parse::<usize>()) {
                    Some(Ok(n)) => n,
                    Some(Err(_)) => {
                        println!("Sample count must be a positive number.");
                        continue;
                    }
                    None => 10_000,
                };
                let counts = spread(&ring, samples)?;
                if counts.is_empty() {
                    println!("Ring is empty");
                }
                for (node, count) in counts {
                    println!(
                        "{:>16}: {:>8} ({:.1}%)",
                        node,
                        count,
                        count as f64 * 100.0 / samples as f64
                    );
                }
            }
            "EXIT" => return Ok(()),
            _ => println!("invalid entry"),
        };
    }
}
