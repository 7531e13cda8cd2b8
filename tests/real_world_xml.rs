//! Integration tests parsing real-world XML formats.
//!
//! Smoke tests over common document shapes: feeds, SOAP envelopes, build
//! descriptors and catalogs, including whitespace-heavy pretty input.

#![allow(clippy::unwrap_used)]

use xmlgrove::{Document, ParseOptions};

fn parse_and_roundtrip(input: &str) -> Document {
    let doc = Document::parse_str(input).unwrap_or_else(|e| panic!("parse failed: {e}"));
    for output in [doc.xml(), doc.xml_compact()] {
        let doc2 =
            Document::parse_str(&output).unwrap_or_else(|e| panic!("roundtrip parse failed: {e}"));
        assert!(
            doc.root().same_structure(&doc2.root()),
            "structure changed after roundtrip:\n{output}"
        );
    }
    doc
}

// --- Feeds ---

#[test]
fn test_rss_feed() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Example RSS</title>
    <link>http://example.org</link>
    <description>An example RSS feed</description>
    <item>
      <title>First Post</title>
      <description>Hello &amp; welcome!</description>
    </item>
    <item>
      <title>Second Post</title>
      <description><![CDATA[<p>Rich <b>markup</b></p>]]></description>
    </item>
  </channel>
</rss>"#;

    let doc = parse_and_roundtrip(xml);
    let root = doc.root();
    assert_eq!(root.name(), "rss");
    assert_eq!(root.attribute("version"), Some("2.0"));

    let item = root.child("channel").child("item");
    assert_eq!(item.count(), 2);
    assert_eq!(item.child("description").string(), "Hello & welcome!");

    let rich = item.last().child("description");
    assert!(rich.is_cdata());
    assert_eq!(rich.string(), "<p>Rich <b>markup</b></p>");
    assert!(rich.xml().contains("<![CDATA[<p>Rich <b>markup</b></p>]]>"));
}

#[test]
fn test_atom_feed_with_namespace_processing() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<atom:feed xmlns:atom="http://www.w3.org/2005/Atom">
  <atom:title>Example Feed</atom:title>
  <atom:link href="http://example.org/"/>
  <atom:entry>
    <atom:title>Atom-Powered Robots Run Amok</atom:title>
  </atom:entry>
</atom:feed>"#;

    let raw = parse_and_roundtrip(xml);
    assert_eq!(raw.root().name(), "atom:feed");
    assert_eq!(
        raw.root().attribute("xmlns:atom"),
        Some("http://www.w3.org/2005/Atom")
    );

    let options = ParseOptions::default().process_namespaces(true);
    let doc = Document::parse_with_options(xml.as_bytes(), options).unwrap();
    let root = doc.root();
    assert_eq!(root.name(), "feed");
    assert_eq!(root.attributes().count(), 0);
    assert_eq!(
        root.child("entry").child("title").string(),
        "Atom-Powered Robots Run Amok"
    );
    assert_eq!(root.child("link").attribute("href"), Some("http://example.org/"));
}

// --- SOAP ---

#[test]
fn test_soap_envelope() {
    let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <soap:Header>
    <Auth token="abc123"/>
  </soap:Header>
  <soap:Body>
    <GetQuoteResponse xmlns="http://example.org/quotes">
      <Symbol>ACME</Symbol>
      <Price>42.50</Price>
      <Open>true</Open>
    </GetQuoteResponse>
  </soap:Body>
</soap:Envelope>"#;

    let doc = parse_and_roundtrip(xml);
    let response = doc.root().child("soap:Body").child("GetQuoteResponse");
    assert_eq!(response.child("Symbol").string(), "ACME");
    assert_eq!(response.child("Price").double(), Some(42.5));
    assert_eq!(response.child("Open").bool(), Some(true));
    assert_eq!(
        doc.root().child("soap:Header").child("Auth").attribute("token"),
        Some("abc123")
    );
}

// --- Build descriptors ---

#[test]
fn test_maven_pom() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<project>
  <modelVersion>4.0.0</modelVersion>
  <groupId>com.example</groupId>
  <artifactId>demo</artifactId>
  <dependencies>
    <dependency>
      <groupId>junit</groupId>
      <artifactId>junit</artifactId>
      <scope>test</scope>
    </dependency>
    <dependency>
      <groupId>org.slf4j</groupId>
      <artifactId>slf4j-api</artifactId>
    </dependency>
    <dependency>
      <groupId>com.google.guava</groupId>
      <artifactId>guava</artifactId>
      <scope>test</scope>
    </dependency>
  </dependencies>
</project>"#;

    let doc = parse_and_roundtrip(xml);
    let dependency = doc.root().child("dependencies").child("dependency");
    assert_eq!(dependency.count(), 3);
    assert_eq!(dependency.last().child("artifactId").string(), "guava");

    let test_scoped = dependency
        .all()
        .unwrap()
        .into_iter()
        .filter(|dep| dep.child("scope").string() == "test")
        .count();
    assert_eq!(test_scoped, 2);
}

// --- Catalogs ---

#[test]
fn test_plant_catalog_filters() {
    let xml = r#"<CATALOG>
  <PLANT zone="4" light="Mostly Shady">
    <COMMON>Bloodroot</COMMON>
    <PRICE>$2.44</PRICE>
  </PLANT>
  <PLANT zone="3" light="Mostly Shady">
    <COMMON>Columbine</COMMON>
    <PRICE>$9.37</PRICE>
  </PLANT>
  <PLANT zone="4" light="Sun">
    <COMMON>Marsh Marigold</COMMON>
    <PRICE>$6.81</PRICE>
  </PLANT>
  <PLANT light="Sun">
    <COMMON>Cowslip</COMMON>
  </PLANT>
</CATALOG>"#;

    let doc = parse_and_roundtrip(xml);
    let plant = doc.root().child("PLANT");
    assert_eq!(plant.count(), 4);

    let zone4 = plant.all_with_attributes([("zone", "4")]).unwrap();
    assert_eq!(zone4.len(), 2);

    let shady_zone4 = plant
        .all_with_attributes([("zone", "4"), ("light", "Mostly Shady")])
        .unwrap();
    assert_eq!(shady_zone4.len(), 1);
    assert_eq!(shady_zone4[0].child("COMMON").string(), "Bloodroot");

    let zoned = plant.all_containing_attribute_keys(["zone", "light"]).unwrap();
    assert_eq!(zoned.len(), 3);

    assert!(plant.last().child("PRICE").is_missing());
}

#[test]
fn test_comments_and_processing_instructions_are_skipped() {
    let xml = r#"<?xml version="1.0"?>
<!-- generated -->
<?xml-stylesheet type="text/xsl" href="style.xsl"?>
<config>
  <!-- the port -->
  <port>8080</port>
  <?app reload?>
</config>"#;

    let doc = Document::parse_str(xml).unwrap();
    assert_eq!(doc.as_element().children().count(), 1);
    assert_eq!(doc.root().child("port").int(), Some(8080));
    assert_eq!(doc.root().children().count(), 1);
}
