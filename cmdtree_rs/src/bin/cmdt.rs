//! `cmdt` - demonstration binary for the cmdtree router.
//!
//! Declares a small package-manager-flavored command set and feeds the
//! process argument vector through the dispatcher. The resolved invocation
//! comes back as JSON on stdout; dispatch failures go to stderr with a
//! nonzero exit. The end-to-end test suite drives this binary.

use std::process::ExitCode;

use anyhow::Result;
use serde_json::json;

use cmdtree::{Dispatcher, Invocation, SwitchDefinition, TreeBuilder};

type Handler = fn(&Invocation) -> Result<serde_json::Value>;

fn echo(action: &str, inv: &Invocation) -> serde_json::Value {
    json!({
        "action": action,
        "path": inv.path,
        "params": inv.params,
        "switches": inv.switches,
    })
}

fn install(inv: &Invocation) -> Result<serde_json::Value> {
    Ok(echo("install", inv))
}

fn install_forced(inv: &Invocation) -> Result<serde_json::Value> {
    Ok(echo("install-forced", inv))
}

fn remove(inv: &Invocation) -> Result<serde_json::Value> {
    Ok(echo("remove", inv))
}

fn remote_add(inv: &Invocation) -> Result<serde_json::Value> {
    Ok(echo("remote-add", inv))
}

fn run(inv: &Invocation) -> Result<serde_json::Value> {
    Ok(echo("run", inv))
}

fn build_tree() -> Result<cmdtree::PathTree<Handler>> {
    let mut builder: TreeBuilder<Handler> = TreeBuilder::new();

    let pkg = builder.path("pkg")?;
    builder.switch(
        pkg,
        SwitchDefinition::named(Some("v"), Some("verbose"))
            .common()
            .describe("chatty output"),
    )?;

    // Registration order matters: an unguarded registration placed first
    // would win every dispatch. The guarded variant goes first so the plain
    // one acts as the fallback.
    let install_node = builder.route("pkg/install/:name[force = \"true\"]", install_forced)?;
    builder.route("pkg/install/:name", install)?;
    builder.switch(
        install_node,
        SwitchDefinition::named(Some("f"), Some("force")).describe("overwrite existing"),
    )?;
    builder.switch(
        install_node,
        SwitchDefinition::named(None, Some("registry"))
            .value_name("url")
            .default_value("https://crates.io")
            .describe("package source"),
    )?;

    builder.route("pkg/remove/:name", remove)?;
    let remove_node = builder.path("pkg/remove")?;
    builder.alias(remove_node, "rm")?;

    let remote = builder.route("remote/add/:name", remote_add)?;
    builder.switch(
        remote,
        SwitchDefinition::named(None, Some("token"))
            .value_name("t")
            .required()
            .describe("auth token"),
    )?;
    builder.switch(
        remote,
        SwitchDefinition::named(Some("u"), Some("url")).value_name("addr").describe("remote address"),
    )?;

    builder.route("run/...args", run)?;

    Ok(builder.build())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let argv: Vec<String> = std::env::args().skip(1).collect();

    let tree = match build_tree() {
        Ok(tree) => tree,
        Err(err) => {
            eprintln!("cmdt: bad command tree: {err}");
            return ExitCode::from(2);
        }
    };

    if argv.first().map(String::as_str) == Some("tree") {
        // The resolved-tree summary consumed by completion plugins.
        match serde_json::to_string_pretty(&tree.describe()) {
            Ok(text) => {
                println!("{text}");
                return ExitCode::SUCCESS;
            }
            Err(err) => {
                eprintln!("cmdt: {err}");
                return ExitCode::from(2);
            }
        }
    }

    match Dispatcher::new(&tree).dispatch::<serde_json::Value, anyhow::Error>(&argv) {
        Ok(value) => {
            println!("{value:#}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("cmdt: {err}");
            ExitCode::FAILURE
        }
    }
}
