use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use geo_cluster::gateway::router::{Dispatch, dispatch_routes};
use geo_cluster::node::Node;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut bind_addr: SocketAddr = "127.0.0.1:8080".parse()?;
    let mut data_dir = PathBuf::from("./data");
    let mut group_size: usize = 4;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--bind" => {
                bind_addr = args[i + 1].parse()?;
                i += 2;
            }
            "--data-dir" => {
                data_dir = PathBuf::from(&args[i + 1]);
                i += 2;
            }
            "--group-size" => {
                group_size = args[i + 1].parse()?;
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }

    if group_size == 0 {
        anyhow::bail!("--group-size must be at least 1");
    }

    tracing::info!("Starting replica group of {} on {}", group_size, bind_addr);

    // 1. Node names; the first node is the write leader.
    let names: Vec<String> = (1..=group_size)
        .map(|index| format!("storage-1-{}", index))
        .collect();

    // 2. Nodes: engine loop, WAL/snapshot paths, peer sinks.
    let mut nodes = Vec::new();
    for (index, name) in names.iter().enumerate() {
        let peers: Vec<String> = names.iter().filter(|n| *n != name).cloned().collect();
        let node_dir = data_dir.join("1").join((index + 1).to_string());
        let node = Node::start(name, peers, index == 0, &node_dir, bind_addr);
        nodes.push(node);
    }

    // 3. Routes: the public dispatch surface plus every node's endpoints.
    let dispatch = Arc::new(Dispatch {
        nodes: names.clone(),
        leaders: vec![names[0].clone()],
    });
    let mut app = dispatch_routes(dispatch);
    for node in &nodes {
        app = app.nest(&format!("/{}", node.name), node.routes());
    }

    // 4. Serve until ctrl-c, then stop every engine.
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("HTTP server listening on {}", bind_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    let shutdown_nodes = nodes.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
            for node in &shutdown_nodes {
                node.stop();
            }
        })
        .await?;

    Ok(())
}
