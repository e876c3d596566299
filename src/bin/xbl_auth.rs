//! `xbl-auth`: sign in, inspect the cached identity token, and print platform credentials.

// crates.io
use clap::{Parser, Subcommand};
use color_eyre::Result;
use tracing_subscriber::EnvFilter;
// self
use xbl_broker::{
	auth::CapturedRedirectUrl, config::BrokerConfig, flows::ReqwestBroker, xbl::XblAuthorization,
};

#[derive(Debug, Parser)]
#[command(name = "xbl-auth", version, about)]
struct Cli {
	#[command(subcommand)]
	command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Acquire an identity token and print a summary of it (never the token itself).
	Token,
	/// Run the full pipeline and print shell `export` lines for the session credentials.
	Xbl {
		/// Captured browser redirect URL to use instead of the token cache.
		#[arg(long, env = "XBL_REDIRECT_URL", hide_env_values = true)]
		redirect_url: Option<String>,
	},
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let cli = Cli::parse();
	let config = BrokerConfig::from_env()?;

	init_tracing(config.debug);

	let broker = ReqwestBroker::from_config(&config)?;

	match cli.command {
		Command::Token => print_token_summary(&broker, &config).await?,
		Command::Xbl { redirect_url } => {
			let authorization = match redirect_url {
				Some(url) => broker.xbl_authorization_from_source(&CapturedRedirectUrl(url)).await?,
				None => broker.xbl_authorization().await?,
			};

			print_exports(&authorization);
		},
	}

	Ok(())
}

fn init_tracing(debug: bool) {
	let fallback = if debug { "xbl_broker=debug,info" } else { "info" };
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

async fn print_token_summary(broker: &ReqwestBroker, config: &BrokerConfig) -> Result<()> {
	let acquired = broker.acquire().await?;
	let set = &acquired.token_set;

	println!("OK");
	println!("mode: {}", acquired.provenance);
	println!("cache: {}", config.cache_path.display());
	println!("expires_at: {}", set.expires_at.unix_timestamp());
	println!("scope: {}", set.scope);
	println!("has_refresh_token: {}", set.usable_refresh_token().is_some());
	println!("client_id: {}", config.client_id);

	if let Some(claims) = set.id_claims() {
		let show = |value: Option<&str>| value.unwrap_or("-").to_owned();

		println!("account: {}", show(claims.account()));
		println!("name: {}", show(claims.name.as_deref()));
		println!("tenant_id(tid): {}", show(claims.tid.as_deref()));
		println!("object_id(oid): {}", show(claims.oid.as_deref()));
		println!("issuer: {}", show(claims.iss.as_deref()));
		println!("audience(aud): {}", claims.audience().unwrap_or_else(|| "-".into()));
	}

	Ok(())
}

fn print_exports(authorization: &XblAuthorization) {
	println!("export XSTS_UHS=\"{}\"", authorization.user_hash);
	println!("export XSTS_TOKEN=\"{}\"", authorization.token.expose());
	println!("export XBL3_AUTH=\"{}\"", authorization.header());
	println!("export XSTS_RELYING_PARTY=\"{}\"", authorization.relying_party);
}
