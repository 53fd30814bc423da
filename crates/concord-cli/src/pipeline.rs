//! Coding pipeline: personas produce independent passes, consensus keeps what they share.

use std::time::Instant;

use anyhow::Context;
use concord_consensus::{
    ConsensusResult, PassProducer, PassResult, Persona, RemotePassSource, resolve_consensus,
    run_passes,
};
use concord_core::{Category, Document};

#[derive(Debug)]
pub struct PipelineStats {
    pub passes: usize,
    pub pass_annotations: usize,
    pub elapsed_secs: f64,
}

/// Run every persona over `document`, then resolve consensus at `fraction`.
pub async fn run_code_pipeline(
    producer: &dyn PassProducer,
    document: &Document,
    categories: &[Category],
    personas: &[Persona],
    fraction: f64,
) -> anyhow::Result<(ConsensusResult, PipelineStats)> {
    let start = Instant::now();

    // 1. Independent passes, one per persona.
    eprintln!("  Running {} passes over {}", personas.len(), document.id);
    let passes = run_passes(producer, document, categories, personas)
        .await
        .context("producing coding passes")?;
    for pass in &passes {
        eprintln!("    {:<16} {} annotations", pass.pass_id, pass.annotations.len());
    }
    resolve_passes(passes, fraction, start)
}

/// Fetch every finished pass for `document` from a pass service, then resolve consensus.
pub async fn run_remote_pipeline(
    source: &RemotePassSource,
    document: &Document,
    fraction: f64,
) -> anyhow::Result<(ConsensusResult, PipelineStats)> {
    let start = Instant::now();

    // 1. Completed passes, in one request.
    eprintln!("  Fetching passes for {}", document.id);
    let passes = source
        .fetch_passes(&document.id)
        .await
        .context("fetching coding passes")?;
    for pass in &passes {
        eprintln!("    {:<16} {} annotations", pass.pass_id, pass.annotations.len());
    }

    resolve_passes(passes, fraction, start)
}

// 2. Keep only reproduced claims.
fn resolve_passes(
    passes: Vec<PassResult>,
    fraction: f64,
    start: Instant,
) -> anyhow::Result<(ConsensusResult, PipelineStats)> {
    let pass_annotations = passes.iter().map(|p| p.annotations.len()).sum();
    let consensus = resolve_consensus(&passes, Some(fraction)).context("resolving consensus")?;

    let stats = PipelineStats {
        passes: passes.len(),
        pass_annotations,
        elapsed_secs: start.elapsed().as_secs_f64(),
    };
    Ok((consensus, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use concord_consensus::{PatternPass, default_personas};

    #[tokio::test]
    async fn pipeline_over_pattern_passes() {
        let doc = Document::new(
            "interview-1",
            "Honestly the salary was the main reason I applied.\n\n\
             My colleagues became close friends over the years.",
        );
        let cats = vec![
            Category::new("money", "Financial motivation")
                .with_description("salary, pay and money as a reason to work"),
            Category::new("team", "Team belonging")
                .with_description("colleagues, close friends and friendship"),
        ];
        let (consensus, stats) =
            run_code_pipeline(&PatternPass::default(), &doc, &cats, &default_personas(), 2.0 / 3.0)
                .await
                .unwrap();
        assert_eq!(stats.passes, 3);
        assert!(stats.pass_annotations >= consensus.annotations.len());
        assert_eq!(consensus.required_passes, 2);
        assert!(consensus.annotations.iter().all(|a| a.confidence.unwrap() >= 2.0 / 3.0 - 1e-9));
    }

    #[tokio::test]
    async fn invalid_fraction_is_reported() {
        let doc = Document::new("d", "Nothing to see in this short note.");
        let err = run_code_pipeline(&PatternPass::default(), &doc, &[], &default_personas(), 0.0)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "resolving consensus");
    }

    #[tokio::test]
    async fn remote_pipeline_resolves_fetched_passes() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let claim = |pass: &str| {
            format!(
                r#"{{"pass_id":"{pass}","annotations":[{{"document_id":"d","category_id":"Pay","start":0,"end":10,"text":"salary","attribution":{{"kind":"method","id":"{pass}"}},"created_at":"2026-02-21T10:00:00Z"}}]}}"#
            )
        };
        let body = format!("[{},{},{{\"pass_id\":\"c\",\"annotations\":[]}}]", claim("a"), claim("b"));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let mut read = 0;
            while !buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf[read..]).await.unwrap();
                if n == 0 {
                    break;
                }
                read += n;
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        let source = RemotePassSource::with_client(format!("http://{addr}"), client);
        let doc = Document::new("d", "salary talk");
        let (consensus, stats) = run_remote_pipeline(&source, &doc, 2.0 / 3.0).await.unwrap();
        assert_eq!(stats.passes, 3);
        assert_eq!(stats.pass_annotations, 2);
        assert_eq!(consensus.annotations.len(), 1);
        assert_eq!(consensus.annotations[0].category_id, "Pay");
    }
}
