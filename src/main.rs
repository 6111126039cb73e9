use std::sync::Arc;
use token_backend::{AuthBackend, Backend, BackendConfig, MemoryBackend, RestBackend};
use token_core::ClientConfig;
use token_metrics::{MetricsConfig, MetricsServer};
use token_service::{Authenticator, TokenDashboard, TokenService};
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (ignore if not found)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(Level::WARN.into())
                .add_directive("piso_token=info".parse()?)
                .add_directive("token_service=info".parse()?),
        )
        .init();

    let config = ClientConfig::from_env().with_contract_arg(std::env::args().nth(1));
    info!(
        demo_mode = config.demo_mode,
        contract_id = ?config.contract_id,
        transaction_limit = config.transaction_limit,
        "PISO token client starting"
    );

    let metrics_config = MetricsConfig::from_env();
    if metrics_config.enabled {
        let metrics_server = MetricsServer::new(metrics_config);
        tokio::spawn(async move {
            if let Err(e) = metrics_server.run().await {
                error!(error = %e, "Metrics server error");
            }
        });
        info!("Metrics server started");
    }

    if config.demo_mode {
        warn!("Running against the seeded in-memory backend");
        return run(Arc::new(MemoryBackend::seeded_demo()), &config).await;
    }

    let backend_config = match BackendConfig::from_env() {
        Ok(backend_config) => backend_config,
        Err(e) => {
            error!(error = %e, "Failed to load backend configuration");
            std::process::exit(1);
        }
    };
    let backend = RestBackend::new(backend_config)?;
    if let Err(e) = backend.health_check().await {
        warn!(error = %e, "Backend health check failed, continuing");
    }
    run(Arc::new(backend), &config).await
}

async fn run<B>(backend: Arc<B>, config: &ClientConfig) -> anyhow::Result<()>
where
    B: Backend + AuthBackend + 'static,
{
    let authenticator = Authenticator::new(backend.clone());
    let session = match &config.credentials {
        Some(credentials) => {
            match authenticator
                .sign_in(&credentials.email, &credentials.password)
                .await
            {
                Ok(session) => Some(session),
                Err(e) => {
                    error!(error = %e, email = %credentials.email, "Sign-in failed");
                    None
                }
            }
        }
        None => {
            info!("No credentials configured, browsing in preview mode");
            None
        }
    };

    let mut service = TokenService::new(backend);
    if let Some(session) = session.clone() {
        service = service.with_session(session);
    }

    let mut dashboard = TokenDashboard::new(service, config.transaction_limit);
    dashboard.load(config.contract_id.as_deref()).await;
    if let Some(message) = dashboard.error() {
        anyhow::bail!("{message}");
    }

    print_snapshot(&dashboard).await;

    if let Some(session) = session {
        if let Err(e) = authenticator.sign_out(session).await {
            warn!(error = %e, "Sign-out failed");
        }
    }
    Ok(())
}

async fn print_snapshot<B: Backend>(dashboard: &TokenDashboard<B>) {
    if let Some(session) = dashboard.service().session() {
        println!("Signed in as {} ({})", session.display_name(), session.address());
    }

    println!("Token contracts:");
    for contract in dashboard.contracts() {
        let marker = if dashboard.selected().map(|s| s.id.as_str()) == Some(contract.id.as_str()) {
            "*"
        } else {
            " "
        };
        println!(
            " {marker} {} ({}) id={} decimals={}",
            contract.name,
            contract.display_symbol(),
            contract.id,
            contract.decimals
        );
    }

    let Some(overview) = dashboard.overview().await else {
        println!("No token contracts found");
        return;
    };

    println!();
    println!("{} ({})", overview.name, overview.symbol);
    println!(
        "  Supply: {} / {} ({}%)",
        overview.total_supply_display(),
        overview.max_supply_display(),
        overview.supply_progress_percent()
    );
    if let Some(balance) = dashboard.selected_balance() {
        println!(
            "  Your balance: {} ({}% of supply)",
            token_core::format_base_units(balance.balance, overview.decimals)
                .unwrap_or_else(|_| "0".to_string()),
            overview.holding_share_percent(Some(balance))
        );
    }
    for e in &overview.errors {
        println!("  ! {}", e.message());
    }

    if !dashboard.balances().is_empty() {
        println!();
        println!("Balances:");
        for balance in dashboard.balances() {
            let summary = balance.token_contracts.clone().unwrap_or_default();
            println!(
                "  {:<8} {}",
                summary.display_symbol(),
                token_core::format_base_units(balance.balance, balance.decimals())
                    .unwrap_or_else(|_| "0".to_string())
            );
        }
    }

    if !dashboard.allowances().is_empty() {
        println!();
        println!("Allowances:");
        for allowance in dashboard.allowances() {
            let summary = allowance.token_contracts.clone().unwrap_or_default();
            let spender = allowance.spender.clone().unwrap_or_default();
            println!(
                "  {} may spend {} {}",
                spender.display_name(),
                token_core::format_base_units(allowance.allowance, summary.decimals)
                    .unwrap_or_else(|_| "0".to_string()),
                summary.display_symbol()
            );
        }
    }

    println!();
    println!("Transaction history:");
    let views = dashboard.transaction_views();
    if views.is_empty() {
        println!("  No transactions found");
    }
    for view in views {
        println!(
            "  {} {} {:<10} {:>20}  {}  {}",
            view.date(),
            view.time(),
            view.kind(),
            view.amount(),
            view.parties().unwrap_or_default(),
            view.short_hash().unwrap_or_default()
        );
    }
    if let Some(notice) = dashboard.history_notice() {
        println!("  {notice}");
    }
}
