use super::*;
use crate::config::{FeedConfig, RetryConfig};
use crate::error::Error;
use crate::normalize::{RecordVariant, normalize_record};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn award_entry(piid: &str, obligated: &str) -> String {
    format!(
        r#"<entry>
    <title><![CDATA[DELIVERY ORDER {piid} awarded to ACME CORP]]></title>
    <link rel="alternate" type="text/html" href="https://www.fpds.gov/ezsearch/search.do?q={piid}"/>
    <modified>2025-02-10 09:15:00</modified>
    <content xmlns:ns1="https://www.fpds.gov/FPDS" type="application/xml">
      <ns1:award version="1.5">
        <ns1:awardID>
          <ns1:awardContractID>
            <ns1:agencyID name="DEPT OF THE NAVY">1700</ns1:agencyID>
            <ns1:PIID>{piid}</ns1:PIID>
            <ns1:modNumber>0</ns1:modNumber>
          </ns1:awardContractID>
          <ns1:referencedIDVID>
            <ns1:PIID>N0002325D0001</ns1:PIID>
          </ns1:referencedIDVID>
        </ns1:awardID>
        <ns1:dollarValues>
          <ns1:obligatedAmount>{obligated}</ns1:obligatedAmount>
          <ns1:baseAndAllOptionsValue>5000.00</ns1:baseAndAllOptionsValue>
        </ns1:dollarValues>
        <ns1:contractData>
          <ns1:contractActionType description="DELIVERY ORDER">C</ns1:contractActionType>
          <ns1:descriptionOfContractRequirement>JET FUEL &amp; SERVICES</ns1:descriptionOfContractRequirement>
        </ns1:contractData>
        <ns1:vendor>
          <ns1:vendorHeader>
            <ns1:vendorName>ACME CORP</ns1:vendorName>
          </ns1:vendorHeader>
        </ns1:vendor>
        <ns1:placeOfPerformance>
          <ns1:principalPlaceOfPerformance>
            <ns1:stateCode name="VIRGINIA">VA</ns1:stateCode>
          </ns1:principalPlaceOfPerformance>
        </ns1:placeOfPerformance>
      </ns1:award>
    </content>
  </entry>"#
    )
}

fn idv_entry() -> String {
    r#"<entry>
    <title>IDV N0002325D0001</title>
    <content xmlns:ns1="https://www.fpds.gov/FPDS" type="application/xml">
      <ns1:IDV version="1.5">
        <ns1:contractID>
          <ns1:IDVID>
            <ns1:PIID>N0002325D0001</ns1:PIID>
          </ns1:IDVID>
        </ns1:contractID>
        <ns1:dollarValues>
          <ns1:obligatedAmount>0.00</ns1:obligatedAmount>
        </ns1:dollarValues>
      </ns1:IDV>
    </content>
  </entry>"#
        .to_string()
}

fn feed(entries: &[String], next: Option<&str>) -> String {
    let next_link = next
        .map(|href| format!(r#"<link rel="next" type="application/atom+xml" href="{href}"/>"#))
        .unwrap_or_default();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="text">FPDS Federal Procurement Data System</title>
  <link rel="self" type="application/atom+xml" href="https://www.fpds.gov/ezsearch/FEEDS/ATOM"/>
  {next_link}
  {}
</feed>"#,
        entries.join("\n")
    )
}

fn client_for(server: &MockServer, max_pages: usize) -> FpdsClient {
    let feed = FeedConfig {
        base_url: format!("{}/ATOM", server.uri()),
        request_timeout: Duration::from_secs(5),
        max_pages,
        ..Default::default()
    };
    let retry = RetryConfig {
        max_attempts: 2,
        initial_delay: Duration::from_millis(5),
        max_delay: Duration::from_millis(20),
        backoff_multiplier: 2.0,
        jitter: false,
    };
    FpdsClient::new(feed, retry).expect("client")
}

#[test]
fn parser_flattens_entry_elements_and_attributes() {
    let page = parse_feed_page(&feed(&[award_entry("N0002325F0001", "1,250.00")], None)).unwrap();
    assert_eq!(page.records.len(), 1);
    assert!(!page.has_next);

    let r = &page.records[0];
    assert_eq!(r["title"], "DELIVERY ORDER N0002325F0001 awarded to ACME CORP");
    assert_eq!(r["modified"], "2025-02-10 09:15:00");
    assert_eq!(
        r["link__href"],
        "https://www.fpds.gov/ezsearch/search.do?q=N0002325F0001"
    );
    assert_eq!(r["content__type"], "application/xml");
    assert_eq!(r["content__award__version"], "1.5");
    assert_eq!(
        r["content__award__awardID__awardContractID__PIID"],
        "N0002325F0001"
    );
    assert_eq!(
        r["content__award__awardID__awardContractID__agencyID__name"],
        "DEPT OF THE NAVY"
    );
    assert_eq!(
        r["content__award__contractData__contractActionType"],
        "C"
    );
    assert_eq!(
        r["content__award__contractData__contractActionType__description"],
        "DELIVERY ORDER"
    );
    assert_eq!(
        r["content__award__contractData__descriptionOfContractRequirement"],
        "JET FUEL & SERVICES"
    );
    assert_eq!(r["contract_type"], "AWARD");
    assert!(
        !r.keys().any(|k| k.contains("xmlns")),
        "namespace declarations are not data"
    );
}

#[test]
fn parser_output_feeds_the_normalizer() {
    let page = parse_feed_page(&feed(
        &[award_entry("N0002325F0001", "$1,250.00"), idv_entry()],
        None,
    ))
    .unwrap();

    assert_eq!(RecordVariant::detect(&page.records[0]), RecordVariant::Award);
    assert_eq!(RecordVariant::detect(&page.records[1]), RecordVariant::Idv);

    let award = normalize_record(&page.records[0]);
    assert_eq!(award.piid, "N0002325F0001");
    assert_eq!(award.ref_idv_piid, "N0002325D0001");
    assert_eq!(award.obligated_amount, 1250.0);
    assert_eq!(award.base_and_all_options_value, 5000.0);
    assert_eq!(award.action_type_description, "DELIVERY ORDER");
    assert_eq!(award.vendor_name, "ACME CORP");
    assert_eq!(award.pop_state, "VA");
    assert_eq!(award.contract_type, "AWARD");
    assert_eq!(award.last_modified, "2025-02-10 09:15:00");

    let idv = normalize_record(&page.records[1]);
    assert_eq!(idv.piid, "N0002325D0001");
    assert_eq!(idv.contract_type, "IDV");
    assert_eq!(idv.ref_idv_piid, "");
}

#[test]
fn parser_detects_next_link() {
    let page = parse_feed_page(&feed(
        &[idv_entry()],
        Some("https://www.fpds.gov/ezsearch/FEEDS/ATOM?start=10"),
    ))
    .unwrap();
    assert!(page.has_next);
}

#[test]
fn parser_accepts_empty_feed() {
    let page = parse_feed_page(&feed(&[], None)).unwrap();
    assert!(page.records.is_empty());
    assert!(!page.has_next);
}

#[test]
fn parser_rejects_non_feed_documents() {
    let err = parse_feed_page("<html><body>Service temporarily unavailable</body></html>")
        .unwrap_err();
    assert!(matches!(err, Error::Feed(_)), "got {err:?}");
}

#[test]
fn parser_rejects_malformed_xml() {
    let err = parse_feed_page("<feed><entry><title>x</entry></feed>").unwrap_err();
    assert!(matches!(err, Error::Xml(_)), "got {err:?}");
}

#[tokio::test]
async fn client_follows_pages_until_no_next_link() {
    let server = MockServer::start().await;
    let first: Vec<String> = (1..=10)
        .map(|n| award_entry(&format!("N0002325F{n:04}"), "100"))
        .collect();

    Mock::given(method("GET"))
        .and(path("/ATOM"))
        .and(query_param("q", "REF_IDV_PIID:\"N0002325D0001\""))
        .and(query_param("FEEDNAME", "PUBLIC"))
        .and(query_param("start", "0"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(feed(&first, Some("next-page"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/ATOM"))
        .and(query_param("start", "10"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(feed(&[award_entry("N0002325F0011", "50")], None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 100);
    let records = client.fetch_by_ref_idv("N0002325D0001").await.unwrap();

    assert_eq!(records.len(), 11);
    assert_eq!(
        records[10]["content__award__awardID__awardContractID__PIID"],
        "N0002325F0011"
    );
}

#[tokio::test]
async fn client_returns_empty_for_vehicle_without_orders() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ATOM"))
        .respond_with(ResponseTemplate::new(200).set_body_string(feed(&[], None)))
        .mount(&server)
        .await;

    let records = client_for(&server, 100)
        .fetch_by_ref_idv("N0002325D0099")
        .await
        .unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn client_stops_at_max_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ATOM"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(feed(&[idv_entry()], Some("forever"))),
        )
        .expect(3)
        .mount(&server)
        .await;

    let records = client_for(&server, 3)
        .fetch_by_ref_idv("N0002325D0001")
        .await
        .unwrap();
    assert_eq!(records.len(), 3);
}

#[tokio::test]
async fn client_maps_http_errors_and_retries_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ATOM"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        // initial attempt + 2 retries
        .expect(3)
        .mount(&server)
        .await;

    let err = client_for(&server, 10)
        .fetch_by_ref_idv("N0002325D0001")
        .await
        .unwrap_err();

    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "Service Unavailable");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn client_does_not_retry_client_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ATOM"))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server, 10)
        .fetch_by_ref_idv("N0002325D0001")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Api { status: 400, .. }));
}
