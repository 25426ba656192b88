mod cli;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Command};
use cre_closing_agent::models::CaseMetadata;
use cre_closing_agent::orchestrator::{AuditOptions, DraftOptions};
use cre_closing_agent::utils::logging;
use cre_closing_agent::workflow::FailurePolicy;
use cre_closing_agent::{App, Config, HaltPolicy};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let mut config = Config::from_env().context("加载配置失败")?;
    let folder = match &cli.command {
        Command::Audit(args) => args.folder.clone(),
        Command::Draft(args) => args.folder.clone(),
        Command::Convert(args) => args.folder.clone(),
    };
    if let Some(folder) = folder {
        config.deal_folder = folder;
    }

    // 初始化日志
    logging::init(cli.verbose || config.verbose_logging);

    let app = App::new(config);
    let result = run(&app, &cli).await;

    logging::print_disclaimer();
    result
}

async fn run(app: &App, cli: &Cli) -> Result<()> {
    app.authorize(cli.username.as_deref(), cli.password.as_deref())
        .await?;

    match &cli.command {
        Command::Audit(args) => {
            let options = AuditOptions {
                resume: args.resume,
                halt_policy: if args.single {
                    HaltPolicy::SingleDocument
                } else {
                    HaltPolicy::UntilExhausted
                },
                failure_policy: if args.lenient {
                    FailurePolicy::Lenient
                } else {
                    FailurePolicy::Strict
                },
            };
            let outcome = app.audit(options).await.context("审查失败")?;

            println!("\n--- Audit Findings ---");
            for alert in outcome.state.alerts().entries() {
                println!("{}", alert);
            }
        }
        Command::Draft(args) => {
            let options = DraftOptions {
                case: CaseMetadata::new(args.property.as_str(), args.buyer.as_str()),
                findings_file: args.findings.clone(),
                out: args.out.clone(),
            };
            let outcome = app.draft(options).await.context("起草异议函失败")?;

            println!("{}", outcome.letter);
            println!("\n📥 PDF: {}", outcome.pdf_path.display());
        }
        Command::Convert(args) => {
            let id = app
                .convert(&args.pdf)
                .await
                .with_context(|| format!("转换失败: {}", args.pdf.display()))?;
            println!("✓ {} -> {}", args.pdf.display(), id);
        }
    }

    Ok(())
}
