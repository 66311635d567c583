//! Vaccination point model as published by De Olho na Fila

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use super::lenient;

/// One vaccination point status snapshot, exactly as received from upstream.
///
/// Every field is text on the wire. Typed values are derived on demand by the
/// accessor methods, which never fail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct QueueUnit {
    #[serde(rename = "id_tb_unidades", deserialize_with = "null_as_empty")]
    pub id_str: String,
    #[serde(rename = "equipamento", deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(rename = "endereco", deserialize_with = "null_as_empty")]
    pub address: String,

    #[serde(rename = "tipo_posto", deserialize_with = "null_as_empty")]
    pub type_name: String,
    #[serde(rename = "id_tipo_posto", deserialize_with = "null_as_empty")]
    pub type_id_str: String,
    #[serde(rename = "distrito", deserialize_with = "null_as_empty")]
    pub neighborhood_name: String,
    #[serde(rename = "id_distrito", deserialize_with = "null_as_empty")]
    pub neighborhood_id_str: String,
    #[serde(rename = "crs", deserialize_with = "null_as_empty")]
    pub region_name: String,
    #[serde(rename = "id_crs", deserialize_with = "null_as_empty")]
    pub region_id_str: String,
    /// Local São Paulo time, e.g. `2021-08-11 07:50:49.173`
    #[serde(rename = "data_hora", deserialize_with = "null_as_empty")]
    pub last_updated_at_str: String,
    #[serde(rename = "indice_fila", deserialize_with = "null_as_empty")]
    pub line_index_str: String,
    /// Free text such as `SEM FILA` or `NÃO FUNCIONANDO`
    #[serde(rename = "status_fila", deserialize_with = "null_as_empty")]
    pub line_status: String,

    #[serde(rename = "coronavac", deserialize_with = "null_as_empty")]
    pub coronavac_str: String,
    #[serde(rename = "astrazeneca", deserialize_with = "null_as_empty")]
    pub astrazeneca_str: String,
    #[serde(rename = "pfizer", deserialize_with = "null_as_empty")]
    pub pfizer_str: String,
}

/// Upstream occasionally publishes `null` where text is expected
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl QueueUnit {
    /// Unit id, or 0 if not parseable
    pub fn id(&self) -> i64 {
        lenient::int_or_zero(&self.id_str)
    }

    /// Type id of the unit, or 0 if not parseable
    pub fn type_id(&self) -> i64 {
        lenient::int_or_zero(&self.type_id_str)
    }

    /// Neighborhood (distrito) id, or 0 if not parseable
    pub fn neighborhood_id(&self) -> i64 {
        lenient::int_or_zero(&self.neighborhood_id_str)
    }

    /// Region (CRS) id, or 0 if not parseable
    pub fn region_id(&self) -> i64 {
        lenient::int_or_zero(&self.region_id_str)
    }

    /// Queue size index, or 0 if not parseable
    pub fn line_index(&self) -> i64 {
        lenient::int_or_zero(&self.line_index_str)
    }

    pub fn has_coronavac(&self) -> bool {
        lenient::flag(&self.coronavac_str)
    }

    pub fn has_astrazeneca(&self) -> bool {
        lenient::flag(&self.astrazeneca_str)
    }

    pub fn has_pfizer(&self) -> bool {
        lenient::flag(&self.pfizer_str)
    }

    /// Last time the information on this unit was updated, or the Unix epoch
    /// when upstream sent something unreadable
    pub fn last_updated_at(&self) -> DateTime<Utc> {
        lenient::timestamp_or_epoch(&self.last_updated_at_str)
    }
}

/// Unit with every derived value resolved, as served by `GET /data`
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct NormalizedUnit {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub type_name: String,
    pub type_id: i64,
    pub neighborhood_name: String,
    pub neighborhood_id: i64,
    pub region_name: String,
    pub region_id: i64,
    pub last_updated_at: DateTime<Utc>,
    pub line_index: i64,
    pub line_status: String,
    pub vaccines: VaccineAvailability,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct VaccineAvailability {
    pub coronavac: bool,
    pub astrazeneca: bool,
    pub pfizer: bool,
}

impl From<&QueueUnit> for NormalizedUnit {
    fn from(unit: &QueueUnit) -> Self {
        Self {
            id: unit.id(),
            name: unit.name.clone(),
            address: unit.address.clone(),
            type_name: unit.type_name.clone(),
            type_id: unit.type_id(),
            neighborhood_name: unit.neighborhood_name.clone(),
            neighborhood_id: unit.neighborhood_id(),
            region_name: unit.region_name.clone(),
            region_id: unit.region_id(),
            last_updated_at: unit.last_updated_at(),
            line_index: unit.line_index(),
            line_status: unit.line_status.clone(),
            vaccines: VaccineAvailability {
                coronavac: unit.has_coronavac(),
                astrazeneca: unit.has_astrazeneca(),
                pfizer: unit.has_pfizer(),
            },
        }
    }
}
