/*!
Helpers pour les tests d'intégration statusrep

- Corps de status au format attendu par le client
- Lecture du rapport produit (`<app>,<version>,<rate>`)
- Init des logs tracing côté tests
*/

use anyhow::{bail, Result};
use serde_json::Value;

/// Une ligne du rapport, le taux gardé tel qu'imprimé
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    pub application: String,
    pub version: String,
    pub rate: String,
}

impl ReportLine {
    pub fn new(application: &str, version: &str, rate: &str) -> Self {
        Self {
            application: application.to_string(),
            version: version.to_string(),
            rate: rate.to_string(),
        }
    }
}

/// Découpe la sortie du rapport en lignes. Échoue sur toute ligne mal formée.
pub fn parse_report(output: &[u8]) -> Result<Vec<ReportLine>> {
    let text = std::str::from_utf8(output)?;
    let mut lines = Vec::new();

    for line in text.lines() {
        let parts: Vec<&str> = line.rsplitn(3, ',').collect();
        let [rate, version, application] = parts.as_slice() else {
            bail!("malformed report line: {:?}", line);
        };
        match rate.split_once('.') {
            Some((_, decimals)) if decimals.len() == 2 => {}
            _ => bail!("rate must have two decimals: {:?}", line),
        }
        lines.push(ReportLine::new(application, version, rate));
    }

    Ok(lines)
}

/// Corps JSON d'un endpoint status (clé `Version` avec majuscule)
pub fn status_body(application: &str, version: &str, requests: u64, success: u64, errors: u64) -> Value {
    serde_json::json!({
        "application": application,
        "Version": version,
        "requests_count": requests,
        "success_count": success,
        "error_count": errors,
    })
}

/// Init logging pour tests (sans effet si déjà fait)
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
