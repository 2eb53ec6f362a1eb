//! expense-clearing CLI
//!
//! Compute group balances and settlement plans from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Per-member balances for one group
//! expense-clearing balances --input group.json
//!
//! # Balances plus the settlement plan
//! expense-clearing settle --input group.json --format json
//!
//! # Global clearing across several groups
//! expense-clearing clearing --input groups.json
//!
//! # One member's standing across groups
//! expense-clearing status --input groups.json --member alice
//!
//! # Generate a random group for testing
//! expense-clearing generate --members 6 --expenses 25
//! ```

use expense_clearing::clearing::balances::BalanceCalculator;
use expense_clearing::clearing::report::ClearingSummary;
use expense_clearing::clearing::settlement::SettlementPlanner;
use chrono::NaiveDate;
use expense_clearing::core::balance::BalanceMap;
use expense_clearing::core::currency::CurrencyCode;
use expense_clearing::core::expense::Expense;
use expense_clearing::core::group::Group;
use expense_clearing::core::member::MemberId;
use expense_clearing::simulation::stress_test::{generate_random_group, GroupConfig};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"expense-clearing — shared-expense clearing and settlement for groups

USAGE:
    expense-clearing <COMMAND> [OPTIONS]

COMMANDS:
    balances    Compute per-member net balances for one group
    settle      Compute balances and a settlement plan for one group
    clearing    Merge balances across groups and settle globally
    status      Show one member's standing across groups
    generate    Generate a random group (for testing)
    help        Show this message

OPTIONS (balances, settle, clearing, status):
    --input <FILE>      Path to JSON group file (groups file for clearing/status)
    --format <FORMAT>   Output format: text (default) or json
    --member <NAME>     Member to report on (status only)

OPTIONS (generate):
    --members <N>       Number of members (default: 5)
    --expenses <N>      Number of expenses (default: 20)
    --currencies <LIST> Comma-separated currency codes (default: EUR)
    --output <FILE>     Write to file instead of stdout

EXAMPLES:
    expense-clearing balances --input trip.json
    expense-clearing settle --input trip.json --format json
    expense-clearing clearing --input all-groups.json
    expense-clearing status --input all-groups.json --member alice
    expense-clearing generate --members 8 --currencies EUR,USD,CZK"#
    );
}

/// JSON schema for an input group.
#[derive(serde::Serialize, serde::Deserialize)]
struct GroupInput {
    name: String,
    members: Vec<String>,
    /// code -> value of one unit in the base unit
    currencies: BTreeMap<String, String>,
    expenses: Vec<ExpenseInput>,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct ExpenseInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    amount: String,
    #[serde(default = "default_currency")]
    currency: String,
    paid_by: String,
    beneficiaries: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date: Option<String>,
}

fn default_currency() -> String {
    "EUR".to_string()
}

#[derive(serde::Deserialize)]
struct GroupsFile {
    groups: Vec<GroupInput>,
}

/// JSON output schemas.
#[derive(serde::Serialize)]
struct BalanceOutput {
    member: String,
    net_balance: String,
    status: String,
}

#[derive(serde::Serialize)]
struct OperationOutput {
    from: String,
    to: String,
    amount: String,
}

#[derive(serde::Serialize)]
struct SettleOutput {
    group: String,
    balances: Vec<BalanceOutput>,
    operations: Vec<OperationOutput>,
    total_transferred: String,
}

#[derive(serde::Serialize)]
struct StatusRow {
    group: String,
    total_paid: String,
    net_balance: String,
}

#[derive(serde::Serialize)]
struct StatusOutput {
    member: String,
    groups: Vec<StatusRow>,
    global_net: String,
}

fn parse_decimal(value: &str, what: &str) -> Decimal {
    value.parse().unwrap_or_else(|e| {
        eprintln!("Invalid {} '{}': {}", what, value, e);
        process::exit(1);
    })
}

fn build_group(input: GroupInput) -> Group {
    let mut group = Group::new(&input.name, input.members.iter().map(|m| MemberId::new(m)));

    for (code, rate) in &input.currencies {
        let rate = parse_decimal(rate, "rate");
        group
            .set_rate(CurrencyCode::new(code), rate)
            .unwrap_or_else(|e| {
                eprintln!("Error in group '{}': {}", input.name, e);
                process::exit(1);
            });
    }

    for expense in input.expenses {
        let amount = parse_decimal(&expense.amount, "amount");
        let rate = group
            .rates()
            .resolve(&CurrencyCode::new(&expense.currency))
            .unwrap_or_else(|e| {
                eprintln!("Error in group '{}': {}", input.name, e);
                process::exit(1);
            });

        let mut built = Expense::new(
            MemberId::new(&expense.paid_by),
            amount,
            rate,
            expense.beneficiaries.iter().map(|b| MemberId::new(b)),
        );
        if let Some(description) = expense.description {
            built = built.with_description(description);
        }
        if let Some(date) = expense.date {
            let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d").unwrap_or_else(|e| {
                eprintln!("Invalid date '{}': {}", date, e);
                process::exit(1);
            });
            built = built.with_date(date);
        }
        group.push_expense(built);
    }

    group
}

fn load_group(path: &str) -> Group {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    });

    let input: GroupInput = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "name": "lisbon trip",
  "members": ["alice", "bob"],
  "currencies": {{ "EUR": "1.0", "USD": "0.92" }},
  "expenses": [
    {{ "amount": "100.00", "currency": "EUR", "paid_by": "alice", "beneficiaries": ["alice", "bob"] }}
  ]
}}"#
        );
        process::exit(1);
    });

    build_group(input)
}

fn load_groups(path: &str) -> Vec<Group> {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    });

    let file: GroupsFile = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!(r#"Expected format: {{ "groups": [ <group>, ... ] }}"#);
        process::exit(1);
    });

    file.groups.into_iter().map(build_group).collect()
}

fn balance_outputs(balances: &BalanceMap) -> Vec<BalanceOutput> {
    balances
        .iter()
        .map(|(member, balance)| BalanceOutput {
            member: member.to_string(),
            net_balance: balance.to_string(),
            status: if balance > Decimal::ZERO {
                "CREDITOR".to_string()
            } else if balance < Decimal::ZERO {
                "DEBTOR".to_string()
            } else {
                "SETTLED".to_string()
            },
        })
        .collect()
}

fn print_balances_text(balances: &BalanceMap) {
    for (member, balance) in balances.iter() {
        let status = if balance > Decimal::ZERO {
            "CREDITOR"
        } else if balance < Decimal::ZERO {
            "DEBTOR"
        } else {
            "SETTLED"
        };
        println!("  {:<15} {:>12}  [{}]", member.to_string(), balance.to_string(), status);
    }
}

/// Parse `--input` and `--format` style options shared by most commands.
fn parse_common_opts(args: &[String]) -> (String, String, Option<String>) {
    let mut input_path = None;
    let mut format = "text".to_string();
    let mut member = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--input requires a file path");
                    process::exit(1);
                }));
            }
            "--format" => {
                i += 1;
                format = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--format requires 'text' or 'json'");
                    process::exit(1);
                });
            }
            "--member" => {
                i += 1;
                member = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--member requires a member name");
                    process::exit(1);
                }));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });

    (path, format, member)
}

fn cmd_balances(args: &[String]) {
    let (path, format, _) = parse_common_opts(args);
    let group = load_group(&path);
    let balances = BalanceCalculator::for_group(&group);

    if format == "json" {
        let output = balance_outputs(&balances);
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
    } else {
        println!("=== Balances: {} ===", group.name());
        print_balances_text(&balances);
    }
}

fn cmd_settle(args: &[String]) {
    let (path, format, _) = parse_common_opts(args);
    let group = load_group(&path);
    let balances = BalanceCalculator::for_group(&group);
    let plan = SettlementPlanner::plan(&balances);

    if format == "json" {
        let output = SettleOutput {
            group: group.name().to_string(),
            balances: balance_outputs(&balances),
            operations: plan
                .operations()
                .iter()
                .map(|op| OperationOutput {
                    from: op.from.to_string(),
                    to: op.to.to_string(),
                    amount: op.amount.to_string(),
                })
                .collect(),
            total_transferred: plan.total_transferred().to_string(),
        };
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
    } else {
        println!("{}", ClearingSummary::for_group(&group));
        println!("{}", plan);
    }
}

fn cmd_clearing(args: &[String]) {
    let (path, format, _) = parse_common_opts(args);
    let groups = load_groups(&path);

    let per_group: Vec<BalanceMap> = groups.iter().map(BalanceCalculator::for_group).collect();
    let global = BalanceMap::merged(per_group.iter());
    let plan = SettlementPlanner::plan(&global);

    if format == "json" {
        let output = SettleOutput {
            group: "global".to_string(),
            balances: balance_outputs(&global),
            operations: plan
                .operations()
                .iter()
                .map(|op| OperationOutput {
                    from: op.from.to_string(),
                    to: op.to.to_string(),
                    amount: op.amount.to_string(),
                })
                .collect(),
            total_transferred: plan.total_transferred().to_string(),
        };
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
    } else {
        println!("=== Global Clearing ({} groups) ===", groups.len());
        print_balances_text(&global);
        println!();
        println!("{}", plan);
    }
}

fn cmd_status(args: &[String]) {
    let (path, format, member) = parse_common_opts(args);
    let member = MemberId::new(member.unwrap_or_else(|| {
        eprintln!("Error: --member <NAME> is required");
        process::exit(1);
    }));

    let groups = load_groups(&path);
    let mut rows = Vec::new();
    let mut global_net = Decimal::ZERO;

    for group in &groups {
        if !group.is_member(&member) {
            continue;
        }
        let balances = BalanceCalculator::for_group(group);
        let net = balances.balance(&member);
        global_net += net;
        rows.push(StatusRow {
            group: group.name().to_string(),
            total_paid: group.total_paid_by(&member).to_string(),
            net_balance: net.to_string(),
        });
    }

    if format == "json" {
        let output = StatusOutput {
            member: member.to_string(),
            groups: rows,
            global_net: global_net.to_string(),
        };
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
    } else {
        println!("=== Status: {} ===", member);
        for row in &rows {
            println!(
                "  {:<20} paid {:>10}   net {:>10}",
                row.group, row.total_paid, row.net_balance
            );
        }
        println!("  {:<20} {:>26}", "GLOBAL NET", global_net.to_string());
    }
}

fn cmd_generate(args: &[String]) {
    let mut config = GroupConfig::default();
    let mut output_path = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--members" => {
                i += 1;
                config.member_count = args
                    .get(i)
                    .and_then(|v| v.parse().ok())
                    .unwrap_or_else(|| {
                        eprintln!("--members requires a number");
                        process::exit(1);
                    });
            }
            "--expenses" => {
                i += 1;
                config.expense_count = args
                    .get(i)
                    .and_then(|v| v.parse().ok())
                    .unwrap_or_else(|| {
                        eprintln!("--expenses requires a number");
                        process::exit(1);
                    });
            }
            "--currencies" => {
                i += 1;
                let list = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--currencies requires a comma-separated list");
                    process::exit(1);
                });
                config.currencies = list.split(',').map(CurrencyCode::new).collect();
            }
            "--output" => {
                i += 1;
                output_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--output requires a file path");
                    process::exit(1);
                }));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let group = generate_random_group(&config);

    let input = GroupInput {
        name: group.name().to_string(),
        members: group.members().iter().map(|m| m.to_string()).collect(),
        currencies: group
            .rates()
            .codes()
            .iter()
            .map(|code| {
                let rate = group
                    .rates()
                    .rate(code)
                    .map(|r| r.to_string())
                    .unwrap_or_default();
                (code.to_string(), rate)
            })
            .collect(),
        expenses: group
            .expenses()
            .expenses()
            .iter()
            .map(|e| ExpenseInput {
                description: e.description().map(str::to_string),
                amount: e.amount().to_string(),
                currency: e.currency().code.to_string(),
                paid_by: e.paid_by().to_string(),
                beneficiaries: e.beneficiaries().iter().map(|b| b.to_string()).collect(),
                date: e.date().map(|d| d.to_string()),
            })
            .collect(),
    };

    let json = serde_json::to_string_pretty(&input).unwrap();
    match output_path {
        Some(path) => {
            fs::write(&path, json).unwrap_or_else(|e| {
                eprintln!("Error writing '{}': {}", path, e);
                process::exit(1);
            });
            println!(
                "Wrote {} members, {} expenses to {}",
                group.members().len(),
                group.expenses().len(),
                path
            );
        }
        None => println!("{}", json),
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "balances" => cmd_balances(&args[2..]),
        "settle" => cmd_settle(&args[2..]),
        "clearing" => cmd_clearing(&args[2..]),
        "status" => cmd_status(&args[2..]),
        "generate" => cmd_generate(&args[2..]),
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage();
            process::exit(1);
        }
    }
}
