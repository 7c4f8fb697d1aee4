use crate::commands::{
    run_amortization, run_capacity, run_demo, run_evaluate, run_payment, AmortizationArgs,
    CapacityArgs, DemoArgs, EvaluateArgs, LoanTermsArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use creditscore::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "creditscore",
    about = "Evaluate loan applications against HCSF affordability rules and simulate loans",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Evaluate a single loan application
    Evaluate(EvaluateArgs),
    /// Quote the monthly payment and total cost of a loan
    Payment(LoanTermsArgs),
    /// Compute the maximum principal an income can support
    Capacity(CapacityArgs),
    /// Print the yearly amortization schedule of a loan
    Amortization(AmortizationArgs),
    /// Run the canonical dossiers through the decision engine
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Evaluate(args) => run_evaluate(args),
        Command::Payment(args) => run_payment(args),
        Command::Capacity(args) => run_capacity(args),
        Command::Amortization(args) => run_amortization(args),
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definitions_are_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn evaluate_accepts_application_flags() {
        let cli = Cli::try_parse_from([
            "creditscore",
            "evaluate",
            "--annual-income",
            "50000",
            "--principal",
            "200000",
            "--duration-years",
            "20",
            "--age",
            "35",
            "--loan-type",
            "immobilier",
            "--risk-probability",
            "0.1",
            "--json",
        ])
        .expect("flags parse");

        match cli.command {
            Some(Command::Evaluate(args)) => {
                assert_eq!(args.risk_probability, Some(0.1));
                assert!(args.json);
            }
            other => panic!("expected evaluate command, got {other:?}"),
        }
    }

    #[test]
    fn probability_flag_is_range_checked() {
        let result = Cli::try_parse_from([
            "creditscore",
            "evaluate",
            "--annual-income",
            "50000",
            "--principal",
            "200000",
            "--duration-years",
            "20",
            "--age",
            "35",
            "--risk-probability",
            "1.4",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["creditscore"]).expect("parses");
        assert!(cli.command.is_none());
    }
}
