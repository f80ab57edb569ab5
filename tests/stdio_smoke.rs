use anyhow::{Context, Result};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::io::Write;
use std::process::{Command, Stdio};
use tempfile::TempDir;

/// Feed `requests` to a fresh server process and collect one JSON value per
/// output line. Closing stdin ends the server.
fn run_session(requests: &[Value]) -> Result<Vec<Value>> {
    let mut child = Command::new(env!("CARGO_BIN_EXE_file-search-server"))
        .env("RUST_LOG", "off")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .context("spawn file-search-server")?;

    {
        let mut stdin = child.stdin.take().context("child stdin")?;
        for request in requests {
            writeln!(stdin, "{}", request)?;
        }
    }

    let output = child.wait_with_output().context("wait for server")?;
    assert!(output.status.success(), "server exited with {}", output.status);

    String::from_utf8(output.stdout)?
        .lines()
        .map(|line| serde_json::from_str(line).context("response is not JSON"))
        .collect()
}

fn tool_text(response: &Value) -> Result<Value> {
    let text = response["result"]["content"][0]["text"]
        .as_str()
        .context("missing text content")?;
    Ok(serde_json::from_str(text)?)
}

#[test]
fn stdio_session_lists_and_calls_search_tool() -> Result<()> {
    let dir = TempDir::new()?;
    let file = dir.path().join("greetings.txt");
    std::fs::write(&file, "Hello World\ngoodbye\nHELLO again\n")?;
    let file = file.to_str().context("utf-8 temp path")?;

    let responses = run_session(&[
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {
            "protocolVersion": "2025-03-26",
            "capabilities": {},
            "clientInfo": {"name": "smoke", "version": "0"}
        }}),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
        json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call", "params": {
            "name": "search_in_file",
            "arguments": {"filePath": file, "keyword": "World", "caseSensitive": true}
        }}),
        json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call", "params": {
            "name": "search_in_file",
            "arguments": {"filePath": file}
        }}),
    ])?;

    assert_eq!(responses.len(), 4);

    assert_eq!(responses[0]["result"]["protocolVersion"], "2025-03-26");

    let tools = responses[1]["result"]["tools"]
        .as_array()
        .context("tools array")?;
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0]["name"], "search_in_file");

    let result = tool_text(&responses[2])?;
    assert_eq!(result["totalMatches"], 1);
    assert_eq!(
        result["matches"],
        json!([{"lineNumber": 1, "content": "Hello World"}])
    );
    assert_eq!(result["keyword"], "World");
    assert_eq!(result["caseSensitive"], true);

    assert_eq!(responses[3]["result"]["isError"], true);
    assert_eq!(
        tool_text(&responses[3])?,
        json!({"error": "Both filePath and keyword are required"})
    );

    Ok(())
}

#[test]
fn cli_search_json_matches_tool_payload() -> Result<()> {
    let dir = TempDir::new()?;
    let file = dir.path().join("notes.txt");
    std::fs::write(&file, "alpha\nBeta\nbeta gamma\n")?;

    let output = Command::new(env!("CARGO_BIN_EXE_file-search-server"))
        .env("RUST_LOG", "off")
        .args(["search", file.to_str().context("utf-8 temp path")?, "beta", "--json"])
        .output()?;

    assert!(output.status.success());
    let result: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(result["totalMatches"], 2);
    assert_eq!(result["matches"][0]["lineNumber"], 2);
    assert_eq!(result["matches"][1]["content"], "beta gamma");

    Ok(())
}

#[test]
fn cli_search_missing_file_exits_nonzero() -> Result<()> {
    let dir = TempDir::new()?;
    let missing = dir.path().join("nope.txt");

    let output = Command::new(env!("CARGO_BIN_EXE_file-search-server"))
        .env("RUST_LOG", "off")
        .args(["search", missing.to_str().context("utf-8 temp path")?, "x", "--json"])
        .output()?;

    assert_eq!(output.status.code(), Some(1));
    let payload: Value = serde_json::from_slice(&output.stdout)?;
    let message = payload["error"].as_str().context("error message")?;
    assert!(message.starts_with("File not found: "));
    assert!(message.ends_with("nope.txt"));

    Ok(())
}
