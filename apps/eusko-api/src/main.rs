use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = eusko_api::Args::parse();

	eusko_api::run(args).await
}
