//! Asset listing across a release sequence and the CSV listing manifest.
use log::*;

use crate::{
    Result,
    files::Extension,
    forge::{manager::ForgeManager, types::AssetRecord},
    sequence::ReleaseSequence,
};

/// Header row of the listing manifest.
pub const LISTING_HEADER: [&str; 3] = ["name", "size", "url"];

/// True when `name` ends with one of `extensions` (case-sensitive).
pub fn matches_extension(name: &str, extensions: &[Extension]) -> bool {
    extensions.iter().any(|ext| name.ends_with(ext.as_str()))
}

/// Fetch the assets of every release in `sequence`, keeping those whose name
/// ends with one of `extensions`.
///
/// Records keep release order, then the order the forge returned them in.
/// Names are not deduplicated across releases. Any failed fetch discards
/// everything collected so far.
pub async fn list_assets(
    forge_manager: &ForgeManager,
    sequence: &ReleaseSequence,
    extensions: &[Extension],
) -> Result<Vec<AssetRecord>> {
    let mut records = vec![];

    for release in sequence.releases() {
        info!("processing release: {}", release.tag());

        let assets = forge_manager.list_assets(release.tag()).await?;
        let total = assets.len();

        let matching = assets
            .into_iter()
            .filter(|a| matches_extension(&a.name, extensions))
            .collect::<Vec<_>>();

        debug!(
            "release {} holds {} matching assets out of {}",
            release.tag(),
            matching.len(),
            total
        );

        records.extend(matching);
    }

    Ok(records)
}

/// Render the listing manifest: a header row followed by one
/// `name,size,url` row per record, CRLF terminated.
pub fn render_listing(records: &[AssetRecord]) -> String {
    let mut out = String::new();

    push_row(&mut out, LISTING_HEADER.iter().map(|h| h.to_string()));

    for record in records {
        push_row(
            &mut out,
            [
                record.name.clone(),
                record.size.to_string(),
                record.url.clone(),
            ]
            .into_iter(),
        );
    }

    out
}

fn push_row(out: &mut String, fields: impl Iterator<Item = String>) {
    let row = fields.map(|f| quote_field(&f)).collect::<Vec<_>>();
    out.push_str(&row.join(","));
    out.push_str("\r\n");
}

fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::AssetError,
        sequence::resolve,
        test_helpers::{FakeForge, asset, manager_for},
    };

    fn ext(s: &str) -> Extension {
        s.parse().unwrap()
    }

    #[test]
    fn matches_exact_case_sensitive_suffix() {
        let zip = vec![ext(".zip")];

        assert!(matches_extension("a.zip", &zip));
        assert!(!matches_extension("a.ZIP", &zip));
        assert!(!matches_extension("a.zip.sha256", &zip));
        assert!(!matches_extension("azip", &zip));
    }

    #[tokio::test]
    async fn lists_only_matching_assets_in_release_order() {
        let fake = FakeForge::new()
            .with_release("v1", &["b.zip", "notes.txt", "a.zip"])
            .with_release("v1-extra1", &["d.zip", "c.tar.gz", "c.zip"]);
        let manager = manager_for(fake);

        let sequence = resolve(&manager, "v1").await.unwrap();
        let records = list_assets(&manager, &sequence, &[ext(".zip")])
            .await
            .unwrap();

        let names = records.iter().map(|r| r.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["b.zip", "a.zip", "d.zip", "c.zip"]);
        assert!(records.iter().all(|r| r.name.ends_with(".zip")));
    }

    #[tokio::test]
    async fn multiple_extensions_keep_forge_order() {
        let fake = FakeForge::new()
            .with_release("v1", &["a.txt", "b.zip", "c.txt", "d.bin"]);
        let manager = manager_for(fake);

        let sequence = resolve(&manager, "v1").await.unwrap();
        let records =
            list_assets(&manager, &sequence, &[ext(".zip"), ext(".txt")])
                .await
                .unwrap();

        let names = records.iter().map(|r| r.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["a.txt", "b.zip", "c.txt"]);
    }

    #[tokio::test]
    async fn duplicate_names_across_releases_are_kept() {
        let fake = FakeForge::new()
            .with_release("v1", &["a.zip"])
            .with_release("v1-extra1", &["a.zip"]);
        let manager = manager_for(fake);

        let sequence = resolve(&manager, "v1").await.unwrap();
        let records = list_assets(&manager, &sequence, &[ext(".zip")])
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn fetch_failure_mid_sequence_discards_results() {
        let fake = FakeForge::new()
            .with_release("v1", &["a.zip"])
            .with_release("v1-extra1", &["b.zip"])
            .failing_list("v1-extra1");
        let manager = manager_for(fake);

        let sequence = resolve(&manager, "v1").await.unwrap();
        let err = list_assets(&manager, &sequence, &[ext(".zip")])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AssetError::FetchError { ref tag, .. } if tag == "v1-extra1"
        ));
    }

    #[test]
    fn renders_listing_with_header() {
        let csv = render_listing(&[asset("a.zip"), asset("b.zip")]);

        assert_eq!(
            csv,
            "name,size,url\r\n\
             a.zip,5,https://example.com/download/a.zip\r\n\
             b.zip,5,https://example.com/download/b.zip\r\n"
        );
    }

    #[test]
    fn renders_header_only_for_empty_listing() {
        assert_eq!(render_listing(&[]), "name,size,url\r\n");
    }

    #[test]
    fn quotes_fields_that_need_it() {
        let record = AssetRecord {
            name: "a,\"b\".zip".into(),
            size: 1,
            url: "https://example.com/x".into(),
        };

        assert_eq!(
            render_listing(&[record]),
            "name,size,url\r\n\"a,\"\"b\"\".zip\",1,https://example.com/x\r\n"
        );
    }
}
