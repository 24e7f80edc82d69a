use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::AgencyID;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Agency {
    pub id: AgencyID,
    pub name: String,
}

pub fn parse(json: &str) -> Result<Vec<Agency>> {
    let records: Vec<Record> = serde_json::from_str(json)?;
    Ok(records
        .into_iter()
        .map(|rec| Agency {
            id: rec.agency_id,
            name: rec.agency_name.unwrap_or_else(|| format!("Agency {}", rec.agency_id)),
        })
        .collect())
}

#[derive(Deserialize)]
struct Record {
    agency_id: AgencyID,
    agency_name: Option<String>,
}
