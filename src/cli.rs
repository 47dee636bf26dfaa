// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .conflicts_with("jsonl")
            .help("Print pretty JSON instead of a table"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print one JSON object per line"),
    )
}

fn as_of(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("as_of")
            .long("as-of")
            .value_name("YYYY-MM-DD")
            .help("Evaluate as if today were this date"),
    )
}

fn id_arg(help: &'static str) -> Arg {
    Arg::new("id")
        .long("id")
        .required(true)
        .value_parser(value_parser!(i64))
        .help(help)
}

fn period_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("from")
            .long("from")
            .value_name("YYYY-MM-DD")
            .help("First day of the period (inclusive)"),
    )
    .arg(
        Arg::new("to")
            .long("to")
            .value_name("YYYY-MM-DD")
            .help("Last day of the period (inclusive)"),
    )
}

fn config_cmd() -> Command {
    Command::new("config")
        .about("Application settings")
        .subcommand(json_flags(Command::new("show").about("Show current settings")))
        .subcommand(
            Command::new("set-currency")
                .about("Set the default currency code")
                .arg(Arg::new("code").required(true).help("ISO code, e.g. AZN")),
        )
        .subcommand(
            Command::new("set-horizon")
                .about("Set the default forecast horizon in days")
                .arg(
                    Arg::new("days")
                        .required(true)
                        .value_parser(value_parser!(u32)),
                ),
        )
}

fn business_cmd() -> Command {
    Command::new("business")
        .about("Business profile")
        .subcommand(
            Command::new("set")
                .about("Create or replace the business profile")
                .arg(Arg::new("name").long("name").required(true))
                .arg(
                    Arg::new("employees")
                        .long("employees")
                        .required(true)
                        .value_parser(value_parser!(u32)),
                )
                .arg(
                    Arg::new("income")
                        .long("income")
                        .required(true)
                        .help("Annual income"),
                )
                .arg(
                    Arg::new("status")
                        .long("status")
                        .default_value("standard")
                        .help("micro-entrepreneur|small|medium|startup|standard"),
                )
                .arg(
                    Arg::new("exemption")
                        .long("exemption")
                        .help("Exemption rate in [0,1]; defaults to the status default"),
                )
                .arg(Arg::new("currency").long("currency")),
        )
        .subcommand(json_flags(Command::new("show").about("Show the business profile")))
        .subcommand(json_flags(
            Command::new("eligibility").about("Check preferential tax status eligibility"),
        ))
}

fn tx_cmd() -> Command {
    Command::new("tx")
        .about("Transactions")
        .subcommand(
            Command::new("add")
                .about("Record a transaction and categorize it")
                .arg(Arg::new("date").long("date").required(true))
                .arg(Arg::new("amount").long("amount").required(true))
                .arg(Arg::new("merchant").long("merchant").required(true))
                .arg(Arg::new("description").long("description").default_value(""))
                .arg(
                    Arg::new("income")
                        .long("income")
                        .action(ArgAction::SetTrue)
                        .help("Money in rather than out"),
                )
                .arg(Arg::new("currency").long("currency"))
                .arg(
                    Arg::new("category")
                        .long("category")
                        .help("Pin a category instead of using keyword rules"),
                ),
        )
        .subcommand(json_flags(period_args(
            Command::new("list")
                .about("List transactions, newest first")
                .arg(Arg::new("category").long("category"))
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(value_parser!(usize)),
                ),
        )))
        .subcommand(json_flags(
            Command::new("suggest")
                .about("Show the category keyword rules would pick, without storing")
                .arg(Arg::new("merchant").long("merchant").required(true))
                .arg(Arg::new("description").long("description").default_value("")),
        ))
        .subcommand(
            Command::new("categorize")
                .about("Re-run keyword rules over stored transactions (user overrides are kept)"),
        )
        .subcommand(
            Command::new("set-category")
                .about("Override the category of a transaction")
                .arg(id_arg("Transaction id"))
                .arg(Arg::new("category").long("category").required(true)),
        )
        .subcommand(
            Command::new("set-deductible")
                .about("Override the deductible flag of a transaction")
                .arg(id_arg("Transaction id"))
                .arg(
                    Arg::new("value")
                        .long("value")
                        .required(true)
                        .help("true|false"),
                ),
        )
}

fn employee_cmd() -> Command {
    Command::new("employee")
        .about("Employees")
        .subcommand(
            Command::new("add")
                .arg(Arg::new("name").long("name").required(true))
                .arg(Arg::new("position").long("position").default_value(""))
                .arg(
                    Arg::new("salary")
                        .long("salary")
                        .required(true)
                        .help("Monthly gross salary"),
                ),
        )
        .subcommand(json_flags(
            Command::new("list").arg(
                Arg::new("all")
                    .long("all")
                    .action(ArgAction::SetTrue)
                    .help("Include inactive employees"),
            ),
        ))
        .subcommand(Command::new("deactivate").arg(id_arg("Employee id")))
        .subcommand(
            Command::new("set-salary")
                .arg(id_arg("Employee id"))
                .arg(Arg::new("salary").long("salary").required(true)),
        )
}

fn month_arg() -> Arg {
    Arg::new("month")
        .long("month")
        .value_name("YYYY-MM")
        .help("Defaults to the current month")
}

fn payroll_cmd() -> Command {
    Command::new("payroll")
        .about("Payroll")
        .subcommand(json_flags(
            Command::new("calc")
                .about("Break down a single gross salary")
                .arg(Arg::new("gross").required(true)),
        ))
        .subcommand(json_flags(as_of(
            Command::new("preview")
                .about("Compute payroll for active employees without storing")
                .arg(month_arg()),
        )))
        .subcommand(as_of(
            Command::new("process")
                .about("Compute and store payroll for active employees")
                .arg(month_arg()),
        ))
        .subcommand(
            Command::new("pay")
                .about("Mark a processed month as paid")
                .arg(month_arg().required(true))
                .arg(Arg::new("date").long("date").help("Payment date, defaults to today")),
        )
        .subcommand(json_flags(Command::new("history").arg(month_arg())))
}

fn tax_cmd() -> Command {
    Command::new("tax")
        .about("Tax estimates and deadlines")
        .subcommand(json_flags(as_of(period_args(
            Command::new("summary")
                .about("Estimate corporate tax from stored transactions (default: current year to date)"),
        ))))
        .subcommand(json_flags(
            Command::new("eligibility")
                .about("Check preferential status for arbitrary figures")
                .arg(
                    Arg::new("employees")
                        .long("employees")
                        .required(true)
                        .value_parser(value_parser!(u32)),
                )
                .arg(Arg::new("income").long("income").required(true)),
        ))
        .subcommand(json_flags(
            Command::new("savings")
                .about("Tax avoided under each status' default exemption")
                .arg(Arg::new("income").long("income").required(true)),
        ))
        .subcommand(
            Command::new("deadline")
                .about("Registered tax deadlines")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("title").long("title").required(true))
                        .arg(
                            Arg::new("date")
                                .long("date")
                                .required(true)
                                .value_name("YYYY-MM-DD"),
                        ),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(Command::new("rm").arg(id_arg("Deadline id"))),
        )
}

fn cashflow_cmd() -> Command {
    Command::new("cashflow")
        .about("Cash-flow analysis and forecast")
        .subcommand(json_flags(as_of(
            Command::new("analysis")
                .about("Income and expenses over the trailing window")
                .arg(
                    Arg::new("days")
                        .long("days")
                        .default_value("30")
                        .value_parser(value_parser!(u32)),
                ),
        )))
        .subcommand(json_flags(as_of(
            Command::new("forecast")
                .about("Project daily balances and store the result")
                .arg(
                    Arg::new("days")
                        .long("days")
                        .value_parser(value_parser!(i64))
                        .allow_negative_numbers(true)
                        .help("Horizon; defaults to the forecast_horizon_days setting"),
                )
                .arg(
                    Arg::new("balance")
                        .long("balance")
                        .allow_negative_numbers(true)
                        .help("Defaults to the trailing window's net cash flow"),
                ),
        )))
}

fn advice_cmd() -> Command {
    Command::new("advice")
        .about("Recommendations and alerts")
        .subcommand(as_of(
            Command::new("generate").about("Evaluate every rule and replace open advice"),
        ))
        .subcommand(json_flags(Command::new("recommendations")))
        .subcommand(json_flags(
            Command::new("alerts").arg(
                Arg::new("kind")
                    .long("kind")
                    .help("LOW_BALANCE|TAX_DEADLINE"),
            ),
        ))
        .subcommand(Command::new("dismiss").arg(id_arg("Alert id")))
        .subcommand(Command::new("act").arg(id_arg("Recommendation id")))
}

fn rules_cmd() -> Command {
    Command::new("rules")
        .about("Custom keyword rules, consulted before the built-in table")
        .subcommand(
            Command::new("add")
                .arg(Arg::new("keyword").long("keyword").required(true))
                .arg(Arg::new("category").long("category").required(true)),
        )
        .subcommand(json_flags(Command::new("list").arg(
            Arg::new("builtin")
                .long("builtin")
                .action(ArgAction::SetTrue)
                .help("Include the built-in table"),
        )))
        .subcommand(Command::new("rm").arg(id_arg("Rule id")))
}

fn import_cmd() -> Command {
    Command::new("import").about("Import data").subcommand(
        Command::new("transactions")
            .about("CSV columns: date,merchant,amount,description,is_income[,category]")
            .arg(Arg::new("path").long("path").required(true)),
    )
}

fn export_cmd() -> Command {
    let format = || {
        Arg::new("format")
            .long("format")
            .default_value("csv")
            .help("csv|json")
    };
    let out = || Arg::new("out").long("out").required(true);
    Command::new("export")
        .about("Export data")
        .subcommand(period_args(
            Command::new("transactions").arg(format()).arg(out()),
        ))
        .subcommand(
            Command::new("payroll")
                .arg(month_arg().required(true))
                .arg(format())
                .arg(out()),
        )
}

pub fn build_cli() -> Command {
    Command::new("easyfin")
        .about("Bookkeeping, tax, payroll and cash-flow planning for small businesses")
        .version(crate_version!())
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(config_cmd())
        .subcommand(business_cmd())
        .subcommand(tx_cmd())
        .subcommand(employee_cmd())
        .subcommand(payroll_cmd())
        .subcommand(tax_cmd())
        .subcommand(cashflow_cmd())
        .subcommand(advice_cmd())
        .subcommand(rules_cmd())
        .subcommand(import_cmd())
        .subcommand(export_cmd())
        .subcommand(json_flags(as_of(
            Command::new("dashboard").about("Trailing 30-day overview"),
        )))
        .subcommand(Command::new("doctor").about("Report data quality issues"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_consistent() {
        build_cli().debug_assert();
    }
}
