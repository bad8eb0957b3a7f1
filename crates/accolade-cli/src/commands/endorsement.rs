// crates/accolade-cli/src/commands/endorsement.rs
//
// `accolade {endorse, revoke, given, received, influence}`.

use serde::Deserialize;
use serde_json::json;
use tabled::Tabled;

use accolade_core::{EndorsementView, RecipientSummary};

use crate::output::{emit, OutputFormat};
use crate::rpc_client::call;

#[derive(Tabled)]
struct EndorsementRow {
    #[tabled(rename = "Endorser")]
    endorser: String,
    #[tabled(rename = "Recipient")]
    recipient: String,
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Created")]
    created_at: String,
}

impl From<&EndorsementView> for EndorsementRow {
    fn from(v: &EndorsementView) -> Self {
        Self {
            endorser: v.endorser_id.to_string(),
            recipient: v.recipient_id.to_string(),
            domain: v.domain.to_string(),
            created_at: v.created_at.to_rfc3339(),
        }
    }
}

#[derive(Tabled)]
struct DomainRow {
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Endorsements")]
    count: u64,
    #[tabled(rename = "Weight")]
    weight: u64,
    #[tabled(rename = "Endorsers")]
    endorsers: String,
}

fn domain_rows(summary: &RecipientSummary) -> Vec<DomainRow> {
    summary
        .count_by_domain
        .iter()
        .map(|(domain, count)| DomainRow {
            domain: domain.clone(),
            count: *count,
            weight: summary.weight_by_domain.get(domain).copied().unwrap_or(0),
            endorsers: summary
                .endorsers_by_domain
                .get(domain)
                .map(|ids| {
                    ids.iter()
                        .map(|id| id.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .unwrap_or_default(),
        })
        .collect()
}

#[derive(Debug, Deserialize, serde::Serialize)]
struct EndorsementList {
    endorsements: Vec<EndorsementView>,
}

#[derive(Debug, Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct Influence {
    user_id: String,
    influence: u64,
}

/// `accolade endorse --as <endorser> <recipient> <domain>`
pub async fn endorse(
    rpc: &str,
    format: OutputFormat,
    endorser: &str,
    recipient: &str,
    domain: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let view: EndorsementView = call(
        rpc,
        "endorsement/submit",
        json!({"endorser_id": endorser, "recipient_id": recipient, "domain": domain}),
    )
    .await?;
    emit(format, &view, |v| vec![EndorsementRow::from(v)]);
    Ok(())
}

/// `accolade revoke --as <endorser> <domain> [--recipient <id>]`
pub async fn revoke(
    rpc: &str,
    format: OutputFormat,
    endorser: &str,
    domain: &str,
    recipient: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let resp: serde_json::Value = call(
        rpc,
        "endorsement/remove",
        json!({"endorser_id": endorser, "domain": domain, "recipient_id": recipient}),
    )
    .await?;
    match format {
        OutputFormat::Json => println!("{}", crate::output::format_json(&resp)),
        OutputFormat::Table => match recipient {
            Some(r) => println!("Revoked {}'s endorsement of {} in {}", endorser, r, domain),
            None => println!("Revoked {}'s endorsements in {}", endorser, domain),
        },
    }
    Ok(())
}

/// `accolade given <endorser> [--domain <d>]`
pub async fn given(
    rpc: &str,
    format: OutputFormat,
    endorser: &str,
    domain: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let list: EndorsementList = call(
        rpc,
        "endorsement/by_endorser",
        json!({"endorser_id": endorser, "domain": domain}),
    )
    .await?;
    emit(format, &list, |l| {
        l.endorsements.iter().map(EndorsementRow::from).collect()
    });
    Ok(())
}

/// `accolade received <recipient> [--domain <d>]`
pub async fn received(
    rpc: &str,
    format: OutputFormat,
    recipient: &str,
    domain: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let summary: RecipientSummary = call(
        rpc,
        "endorsement/for_recipient",
        json!({"recipient_id": recipient, "domain": domain}),
    )
    .await?;
    if format == OutputFormat::Table {
        println!("{}: {} endorsement(s)", summary.recipient_id, summary.total);
    }
    emit(format, &summary, domain_rows);
    Ok(())
}

/// `accolade influence <user>`
pub async fn influence(
    rpc: &str,
    format: OutputFormat,
    user: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let resp: Influence = call(rpc, "endorsement/influence", json!({"user_id": user})).await?;
    match format {
        OutputFormat::Json => println!("{}", crate::output::format_json(&resp)),
        OutputFormat::Table => println!("{} has influence {}", resp.user_id, resp.influence),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use accolade_core::UserId;

    use super::*;

    #[test]
    fn domain_rows_join_endorsers() {
        let mut summary = RecipientSummary {
            recipient_id: UserId::new("r").unwrap(),
            total: 3,
            count_by_domain: BTreeMap::new(),
            weight_by_domain: BTreeMap::new(),
            endorsers_by_domain: BTreeMap::new(),
        };
        summary.count_by_domain.insert("skill".to_string(), 2);
        summary.count_by_domain.insert("art".to_string(), 1);
        summary.weight_by_domain.insert("skill".to_string(), 7);
        summary.weight_by_domain.insert("art".to_string(), 1);
        summary.endorsers_by_domain.insert(
            "skill".to_string(),
            vec![UserId::new("a").unwrap(), UserId::new("b").unwrap()],
        );
        summary
            .endorsers_by_domain
            .insert("art".to_string(), vec![UserId::new("a").unwrap()]);

        let rows = domain_rows(&summary);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].domain, "art");
        assert_eq!(rows[1].weight, 7);
        assert_eq!(rows[1].endorsers, "a, b");
    }
}
