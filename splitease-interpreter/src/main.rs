#![warn(clippy::uninlined_format_args)]

mod config;
mod ledger_file;

use config::AppConfig;
use ledger_file::LoadedGroup;
use splitease_application::{GroupId, InMemoryLedgerSource, LedgerError, LedgerService};
use splitease_domain::MemberId;
use splitease_presentation::{
    BalancePresenter, DashboardPresenter, SplitPresenter, combine_sections_vertically,
};
use std::{borrow::Cow, env, fs, process};
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Cow<'static, str>>;

const USAGE: &str = "Usage: splitease-interpreter <ledger.json> [--as <member-id>]";

fn main() {
    init_logging();

    if let Err(err) = run() {
        tracing::error!(error = %err, "Interpreter run failed");
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Debug, PartialEq, Eq)]
struct CliArgs {
    path: String,
    viewer: Option<MemberId>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> CliResult<CliArgs> {
    let mut path = None;
    let mut viewer = None;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--as" => {
                let Some(member) = args.next() else {
                    return Err("`--as` needs a member id".into());
                };
                viewer = Some(MemberId::new(member));
            }
            flag if flag.starts_with("--") => {
                return Err(format!("Unknown option '{flag}'\n{USAGE}").into());
            }
            _ if path.is_none() => path = Some(arg),
            _ => return Err(USAGE.into()),
        }
    }

    let Some(path) = path else {
        return Err(USAGE.into());
    };
    Ok(CliArgs { path, viewer })
}

fn run() -> CliResult<()> {
    let config = AppConfig::from_env().map_err(|err| err.to_string())?;
    let args = parse_args(env::args().skip(1))?;

    let Some(viewer) = args.viewer.or(config.default_viewer) else {
        return Err("No viewer given; pass `--as <member-id>` or set SPLITEASE_VIEWER".into());
    };

    let content = fs::read_to_string(&args.path)
        .map_err(|err| format!("Failed to read '{}': {err}", args.path))?;
    let groups = ledger_file::parse(&content)
        .map_err(|err| format!("Invalid ledger '{}': {err}", args.path))?;

    tracing::info!(
        path = %args.path,
        group_count = groups.len(),
        viewer = %viewer,
        "Ledger loaded"
    );

    let (ledgers, planned): (Vec<_>, Vec<_>) = groups
        .into_iter()
        .map(|LoadedGroup { ledger, planned }| (ledger, planned))
        .unzip();
    let source: InMemoryLedgerSource = ledgers.into_iter().collect();
    let service = LedgerService::new(&source);

    for (ledger, planned) in source.groups().zip(&planned) {
        if !ledger.is_member(&viewer) {
            tracing::debug!(group_id = %ledger.id, "Viewer not in group, skipped");
            continue;
        }

        println!("== {} ==", ledger.name);
        for plan in planned {
            println!("{}", SplitPresenter::render(plan, ledger));
        }
        print_group(&service, &ledger.id, &viewer, config.token_decimals)?;
    }

    let dashboard = service
        .dashboard(&viewer)
        .map_err(|err| ledger_error_message(&err))?;
    println!("== Dashboard ==");
    print!("{}", DashboardPresenter::render(&dashboard));

    Ok(())
}

fn print_group(
    service: &LedgerService<'_>,
    group_id: &GroupId,
    viewer: &MemberId,
    token_decimals: u32,
) -> CliResult<()> {
    let view = service
        .group_balances(group_id, viewer)
        .map_err(|err| ledger_error_message(&err))?;
    let report = BalancePresenter::render(&view);

    let mut sections: Vec<Cow<'_, str>> = vec![Cow::Borrowed(report.balance_table.as_str())];
    if let Some(debt_table) = &report.debt_table {
        sections.push(Cow::Borrowed(debt_table.as_str()));
    }

    match LedgerService::settle_up_instructions(&view, token_decimals) {
        Ok(instructions) if !instructions.is_empty() => {
            sections.push(Cow::Owned(BalancePresenter::build_instruction_table(
                &instructions,
            )));
        }
        Ok(_) => {}
        Err(LedgerError::MissingWalletAddress(member)) => {
            tracing::warn!(group_id = %group_id, member = %member, "Settle-up skipped");
            sections.push(Cow::Owned(format!(
                "Cannot settle up yet: {member} has no wallet address"
            )));
        }
        Err(err) => return Err(ledger_error_message(&err)),
    }

    let requests = LedgerService::payment_request_prefills(&view);
    if !requests.is_empty() {
        sections.push(Cow::Owned(BalancePresenter::build_request_table(&requests)));
    }

    let sections: Vec<&str> = sections.iter().map(|section| section.as_ref()).collect();
    if let Some(output) = combine_sections_vertically(&sections) {
        println!("{output}");
    }
    Ok(())
}

fn ledger_error_message(err: &LedgerError) -> Cow<'static, str> {
    Cow::Owned(err.to_string())
}
