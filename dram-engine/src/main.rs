use clap::Parser;
use dram_engine::cellar::Cellar;
use dram_engine::config::CliArgs;
use dram_engine::server::DramServer;
use dram_engine::transport::NdjsonTransport;

fn main() {
	let args = CliArgs::parse();

	// stdout carries protocol frames only
	tracing_subscriber::fmt()
		.with_writer(std::io::stderr)
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
		)
		.init();

	let config = args.into_config();
	match &config.data_dir {
		Some(dir) => tracing::info!(data_dir = %dir.display(), "Using data directory"),
		None => tracing::info!("Running in memory"),
	}

	let cellar = Cellar::open(config);
	let transport = NdjsonTransport::new();
	let mut server = DramServer::new(transport, cellar);

	tracing::info!("dram-engine ready");

	if let Err(e) = server.run() {
		tracing::error!("Server error: {}", e);
		std::process::exit(1);
	}
}
