//! Destination documents as stored in the index.
//!
//! A document has a small set of well-known fields written by the ingestion pipeline. Everything
//! else the source dataset provided (coordinates, raw properties, …) is kept verbatim in
//! [`Destination::extra`] and flattened back into the JSON representation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Categoria {
	One(String),
	Many(Vec<String>),
}
impl Categoria {
	pub fn labels(&self) -> Vec<&str> {
		match self {
			Self::One(label) => vec![label.as_str()],
			Self::Many(labels) => labels.iter().map(String::as_str).collect(),
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Destination {
	pub id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub score: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub nombre: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub descripcion: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub municipio: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub territorio: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub pais: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tipo_recurso: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub source_dataset: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub url_ficha: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub categoria: Option<Categoria>,
	/// Key of the favorite row that referenced this document, set only on enriched favorites.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub favorito_row_id: Option<i64>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}
impl Destination {
	/// Builds a document from an index hit.
	///
	/// The store-assigned `id` wins over any `id` inside the source. Core fields whose value has an
	/// unexpected type are left in `extra` untouched instead of failing the whole document.
	pub fn from_source(id: impl Into<String>, score: Option<f64>, source: Map<String, Value>) -> Self {
		let mut extra = source;

		extra.remove("id");
		extra.remove("score");
		extra.remove("favorito_row_id");

		Self {
			id: id.into(),
			score,
			nombre: take_string(&mut extra, "nombre"),
			descripcion: take_string(&mut extra, "descripcion"),
			municipio: take_string(&mut extra, "municipio"),
			territorio: take_string(&mut extra, "territorio"),
			pais: take_string(&mut extra, "pais"),
			tipo_recurso: take_string(&mut extra, "tipo_recurso"),
			source_dataset: take_string(&mut extra, "source_dataset"),
			url_ficha: take_string(&mut extra, "url_ficha"),
			categoria: take_categoria(&mut extra),
			favorito_row_id: None,
			extra,
		}
	}

	pub fn with_favorite(mut self, favorite_id: i64) -> Self {
		self.favorito_row_id = Some(favorite_id);

		self
	}
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
	match map.get(key) {
		Some(Value::String(_)) => match map.remove(key) {
			Some(Value::String(value)) => Some(value),
			_ => None,
		},
		Some(Value::Null) => {
			map.remove(key);

			None
		},
		_ => None,
	}
}

fn take_categoria(map: &mut Map<String, Value>) -> Option<Categoria> {
	let categoria = match map.get("categoria")? {
		Value::Null => None,
		Value::String(label) => Some(Categoria::One(label.clone())),
		Value::Array(items) => {
			let labels = items
				.iter()
				.map(|item| item.as_str().map(str::to_string))
				.collect::<Option<Vec<_>>>()?;

			Some(Categoria::Many(labels))
		},
		_ => return None,
	};

	map.remove("categoria");

	categoria
}
