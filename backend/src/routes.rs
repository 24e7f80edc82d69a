use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::RouteID;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: RouteID,
    pub short_name: String,
    pub long_name: String,
}

impl Route {
    pub fn describe(&self) -> String {
        if self.long_name.is_empty() {
            return self.short_name.clone();
        }
        format!("{} - {}", self.short_name, self.long_name)
    }
}

pub fn parse(json: &str) -> Result<Vec<Route>> {
    let records: Vec<Record> = serde_json::from_str(json)?;
    let mut routes = Vec::new();
    for rec in records {
        let short_name = match (rec.route_short_name, &rec.route_long_name) {
            (Some(x), _) => x,
            // Some feeds only fill in one of the names
            (None, Some(long)) => long.clone(),
            (None, None) => bail!("{:?} has no name", rec.route_id),
        };
        routes.push(Route {
            id: rec.route_id,
            short_name,
            long_name: rec.route_long_name.unwrap_or_default(),
        });
    }
    Ok(routes)
}

#[derive(Deserialize)]
struct Record {
    route_id: RouteID,
    route_short_name: Option<String>,
    route_long_name: Option<String>,
}
