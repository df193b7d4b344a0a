use anyhow::Result;
use fxhash_verify::{run_with_config, TomlConfig};
use httpmock::prelude::*;
use tempfile::TempDir;

fn config_for(server: &MockServer, source: &str, output: &str) -> Result<TomlConfig> {
    let content = format!(
        r#"
[run]
name = "library-e2e"
check = "library"

{source}

[library]
request_timeout_seconds = 2
attempts = 2
retry_delay_seconds = 0
generic_gateway = "{generic}"
service_gateway = "{service}"

[api]
base_url = "{api}"
graphql_endpoint = "{graphql}"

[output]
path = "{output}"
"#,
        source = source,
        generic = server.url("/generic/ipfs/"),
        service = server.url("/service/ipfs/"),
        api = server.base_url(),
        graphql = server.url("/graphql"),
        output = output,
    );
    Ok(TomlConfig::from_toml_str(&content)?)
}

fn read_rows(path: &str) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

#[tokio::test]
async fn test_three_urls_give_header_and_three_rows() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().join("reports/analysis.csv");
    let output = output.to_str().unwrap().replace('\\', "/");

    let server = MockServer::start();
    for (id, cid) in [(1, "QmOne"), (2, "QmTwo")] {
        server.mock(|when, then| {
            when.method(GET).path(format!("/v1/tokens/{}", id));
            then.status(200).json_body(serde_json::json!({
                "token": {
                    "description": format!("Token {}", id),
                    "ipfs": format!("ipfs://{}", cid),
                    "generativeUri": format!("ipfs://{}", cid),
                    "thumbnailUri": "ipfs://QmThumb"
                }
            }));
        });
    }
    server.mock(|when, then| {
        when.method(GET).path("/generic/ipfs/QmOne");
        then.status(200).body(
            r#"<script src="https://cdnjs.cloudflare.com/ajax/libs/p5.js/1.4.0/p5.min.js"></script>"#,
        );
    });
    server.mock(|when, then| {
        when.method(GET).path("/generic/ipfs/QmTwo");
        then.status(200)
            .body(r#"<script src="https://unpkg.com/three@0.150.0/build/three.min.js"></script>"#);
    });
    server.mock(|when, then| {
        when.method(GET).path("/v1/tokens/3");
        then.status(404);
    });
    server.mock(|when, then| {
        when.method(GET).path("/generative/3");
        then.status(404);
    });

    let urls: Vec<String> = (1..=3)
        .map(|id| format!("\"{}\"", server.url(format!("/generative/{}", id))))
        .collect();
    let source = format!("[source]\nkind = \"static\"\nurls = [{}]", urls.join(", "));
    let config = config_for(&server, &source, &output)?;

    let summary = run_with_config(&config).await?;

    assert_eq!(summary.total, 3);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.output_path, output);

    let rows = read_rows(&output)?;
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0][0], "Link Status");
    assert!(rows.iter().all(|row| row.len() == 14));
    assert!(rows[1..].iter().all(|row| !row[0].is_empty()));

    assert_eq!(rows[1][0], "working");
    assert_eq!(rows[1][1], "Token 1");
    assert_eq!(rows[1][4], "1.4.0");
    assert_eq!(rows[1][5], "No other libraries found");
    assert_eq!(rows[1][10], server.url("/generic/ipfs/QmThumb"));

    assert_eq!(rows[2][4], "No p5.js found");
    assert_eq!(rows[2][5], "https://unpkg.com/three@0.150.0/build/three.min.js");

    assert_eq!(rows[3][0], "Token not found");
    assert_eq!(rows[3][2], server.url("/generative/3"));

    Ok(())
}

#[tokio::test]
async fn test_out_of_range_ids_fill_every_metadata_column_with_placeholder() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().join("out_of_range.csv");
    let output = output.to_str().unwrap().replace('\\', "/");

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path_contains("/v1/tokens/");
        then.status(200).json_body(serde_json::json!({ "token": null }));
    });
    let pages = server.mock(|when, then| {
        when.method(GET).path_contains("/generative/");
        then.status(200)
            .body("<html><body><h1>This token does not exist</h1></body></html>");
    });

    let source = format!(
        "[source]\nkind = \"range\"\nstart = 99999998\nend = 99999999\nurl_template = \"{}\"",
        server.url("/generative/{id}")
    );
    let config = config_for(&server, &source, &output)?;

    let summary = run_with_config(&config).await?;

    pages.assert_hits(2);
    assert_eq!(summary.total, 2);
    assert_eq!(summary.failed, 2);

    let rows = read_rows(&output)?;
    assert_eq!(rows.len(), 3);
    for row in &rows[1..] {
        assert_eq!(row[0], "Token not found");
        for (column, value) in row.iter().enumerate() {
            if column >= 1 && column != 2 {
                assert_eq!(value, "-", "column {} of {:?}", column, row);
            }
        }
    }

    Ok(())
}

#[tokio::test]
async fn test_unwritable_output_aborts_before_any_request() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let blocker = temp_dir.path().join("blocker");
    std::fs::write(&blocker, b"file, not directory")?;
    let output = blocker.join("results.csv");
    let output = output.to_str().unwrap().replace('\\', "/");

    let server = MockServer::start();
    let any_request = server.mock(|when, then| {
        when.path_contains("/");
        then.status(200);
    });

    let source = format!(
        "[source]\nkind = \"static\"\nurls = [\"{}\"]",
        server.url("/generative/1")
    );
    let config = config_for(&server, &source, &output)?;

    let err = run_with_config(&config).await.unwrap_err();

    assert_eq!(err.severity().exit_code(), 3);
    any_request.assert_hits(0);
    Ok(())
}
