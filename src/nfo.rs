/// Media library sidecar (`.nfo`) written next to each organized video
use crate::scrapers::CatalogRecord;
use anyhow::Result;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
#[serde(rename = "movie")]
pub struct MovieNfo {
    pub title: String,
    #[serde(rename = "originaltitle")]
    pub original_title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub rating: String,
    pub plot: String,
    pub director: String,
    pub year: String,
    pub premiered: String,
    pub runtime: String,
    pub genre: Vec<String>,
    pub studio: String,
    pub tag: Vec<String>,
    pub actor: Vec<NfoActor>,
    pub label: String,
    pub num: String,
    pub cover: String,
    pub website: String,
    pub mpaa: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NfoActor {
    pub name: String,
}

impl MovieNfo {
    /// Build the sidecar for `record`, prefixing the title with the formatted
    /// catalog number
    pub fn from_record(record: &CatalogRecord, formatted_number: &str) -> Self {
        let mut tag = record.tags.clone();
        tag.extend(
            [&record.series, &record.label, &record.maker, &record.director]
                .into_iter()
                .filter(|value| !value.is_empty())
                .cloned(),
        );

        Self {
            title: format!("{} {}", formatted_number, record.title),
            original_title: record.original_title.clone(),
            rating: record.rating.clone(),
            plot: record.plot.clone(),
            director: record.director.clone(),
            year: record.year.clone(),
            premiered: record.premiered.clone(),
            runtime: record.runtime.clone(),
            genre: record.tags.clone(),
            studio: record.maker.clone(),
            tag,
            actor: record
                .actors
                .iter()
                .map(|name| NfoActor { name: name.clone() })
                .collect(),
            label: record.label.clone(),
            num: record.number.clone(),
            cover: record.cover.clone(),
            website: record.website.clone(),
            mpaa: "R".to_string(),
        }
    }

    pub fn to_xml(&self) -> Result<String> {
        let mut body = String::new();
        let mut serializer = quick_xml::se::Serializer::new(&mut body);
        serializer.indent(' ', 2);
        self.serialize(serializer)?;

        Ok(format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}\n",
            body
        ))
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        tokio::fs::write(path, self.to_xml()?).await?;
        Ok(())
    }
}
