// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! login1ctl - dispatch login1 user calls offline
//!
//! Loads users from a YAML fixture, sends one call through the user
//! object handler, and prints the reply the way `busctl` would.

mod render;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use colored::*;
use login1_bus::config::SYSTEM_MACHINE_ID_PATH;
use login1_bus::introspect::{INTROSPECTABLE_INTERFACE, PEER_INTERFACE, PROPERTIES_INTERFACE};
use login1_bus::{
    load_fixture, user_path, DispatcherConfig, HandlerResult, InMemoryUsers, MethodCall,
    ObjectPath, Reply, UserObject, Value, USER_INTERFACE_NAME,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "login1ctl")]
#[command(version)]
#[command(about = "Dispatch login1 User calls against a user fixture")]
struct Cli {
    /// YAML fixture with config and users (empty store if omitted)
    #[arg(short, long, value_name = "FILE", global = true)]
    fixture: Option<PathBuf>,

    /// Read the machine id from FILE (bare flag reads /etc/machine-id)
    #[arg(
        long,
        value_name = "FILE",
        global = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = SYSTEM_MACHINE_ID_PATH
    )]
    machine_id_file: Option<PathBuf>,

    /// Also print the encoded reply body as a hex dump
    #[arg(long, global = true)]
    hex: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the introspection XML of a user object
    Introspect { uid: u32 },

    /// Read one property
    Get {
        uid: u32,
        /// Interface name ("" matches any)
        interface: String,
        property: String,
    },

    /// Read every property of an interface
    GetAll {
        uid: u32,
        #[arg(default_value = USER_INTERFACE_NAME)]
        interface: String,
    },

    /// Terminate a user
    Terminate { uid: u32 },

    /// Ping a user object
    Ping { uid: u32 },

    /// Ask a user object for the machine id
    MachineId { uid: u32 },

    /// Send an arbitrary call
    Call {
        /// Object path
        path: String,
        /// Interface name, or "-" for none
        interface: String,
        member: String,
        /// Arguments as TYPE:VALUE (u:1000, s:text, o:/path, b:true)
        args: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if cli.no_color {
        colored::control::set_override(false);
    }

    match run(&cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<i32> {
    let (config, users) = match &cli.fixture {
        Some(path) => load_fixture(path)
            .with_context(|| format!("loading {}", path.display()))?
            .into_store()
            .with_context(|| format!("building users from {}", path.display()))?,
        None => (DispatcherConfig::default(), InMemoryUsers::new()),
    };
    let config = match &cli.machine_id_file {
        Some(path) => config
            .with_machine_id_from(path)
            .with_context(|| format!("reading machine id from {}", path.display()))?,
        None => config,
    };
    log::debug!("{} users, endian {:?}", users.len(), config.endian);

    let object = UserObject::from_backend(Arc::new(users)).with_config(config);
    let call = build_call(&cli.command)?;
    let result = object.handle(&call);
    Ok(report(&call, result, cli.hex))
}

fn build_call(command: &Commands) -> anyhow::Result<MethodCall> {
    let user = |uid: u32| user_path(uid).to_string();
    let call = match command {
        Commands::Introspect { uid } => {
            MethodCall::new(user(*uid), Some(INTROSPECTABLE_INTERFACE), "Introspect")
        }
        Commands::Get {
            uid,
            interface,
            property,
        } => MethodCall::new(user(*uid), Some(PROPERTIES_INTERFACE), "Get")
            .arg(interface.as_str())
            .arg(property.as_str()),
        Commands::GetAll { uid, interface } => {
            MethodCall::new(user(*uid), Some(PROPERTIES_INTERFACE), "GetAll")
                .arg(interface.as_str())
        }
        Commands::Terminate { uid } => {
            MethodCall::new(user(*uid), Some(USER_INTERFACE_NAME), "Terminate")
        }
        Commands::Ping { uid } => MethodCall::new(user(*uid), Some(PEER_INTERFACE), "Ping"),
        Commands::MachineId { uid } => {
            MethodCall::new(user(*uid), Some(PEER_INTERFACE), "GetMachineId")
        }
        Commands::Call {
            path,
            interface,
            member,
            args,
        } => {
            let interface = (interface != "-").then_some(interface.as_str());
            let values = args
                .iter()
                .map(|a| parse_arg(a))
                .collect::<anyhow::Result<Vec<_>>>()?;
            MethodCall::new(path.as_str(), interface, member.as_str()).args(values)
        }
    };
    Ok(call.sender("login1ctl"))
}

/// Parse a `TYPE:VALUE` argument.
fn parse_arg(arg: &str) -> anyhow::Result<Value> {
    let Some((ty, raw)) = arg.split_once(':') else {
        bail!("argument '{}' is not TYPE:VALUE", arg);
    };
    let value = match ty {
        "s" => Value::from(raw),
        "u" => Value::U32(parse_scalar(raw, "a u32")?),
        "i" => Value::I32(parse_scalar(raw, "an i32")?),
        "t" => Value::U64(parse_scalar(raw, "a u64")?),
        "b" => Value::Bool(parse_scalar(raw, "a bool")?),
        "o" => Value::from(ObjectPath::new(raw)?),
        "v" => Value::variant(raw),
        other => bail!("unsupported argument type '{}'", other),
    };
    Ok(value)
}

fn parse_scalar<T>(raw: &str, what: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse()
        .with_context(|| format!("'{}' is not {}", raw, what))
}

fn report(call: &MethodCall, result: HandlerResult, hex: bool) -> i32 {
    if result == HandlerResult::NeedMemory {
        eprintln!(
            "{}: reply exceeds max_reply_size, retry later",
            "NeedMemory".yellow().bold()
        );
        return 2;
    }

    match result.into_reply(call) {
        Some(Reply::Return(ret)) => {
            print!("{}", render::method_return(&ret));
            if hex {
                print!("{}", render::hex_dump(&ret.encoded));
            }
            0
        }
        Some(Reply::Error(err)) => {
            eprintln!("{}: {}", err.name.red().bold(), err.message);
            1
        }
        None => 2,
    }
}
