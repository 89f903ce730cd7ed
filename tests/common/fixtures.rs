//! ATOM feed fixtures

/// One award entry referencing `ref_idv`
pub fn award_entry(piid: &str, ref_idv: &str, obligated: &str, description: &str) -> String {
    format!(
        r#"<entry>
    <title>DELIVERY ORDER {piid}</title>
    <link rel="alternate" type="text/html" href="https://www.fpds.gov/ezsearch/search.do?q={piid}"/>
    <modified>2025-03-01 12:00:00</modified>
    <content xmlns:ns1="https://www.fpds.gov/FPDS" type="application/xml">
      <ns1:award version="1.5">
        <ns1:awardID>
          <ns1:awardContractID>
            <ns1:PIID>{piid}</ns1:PIID>
            <ns1:modNumber>0</ns1:modNumber>
          </ns1:awardContractID>
          <ns1:referencedIDVID>
            <ns1:PIID>{ref_idv}</ns1:PIID>
          </ns1:referencedIDVID>
        </ns1:awardID>
        <ns1:dollarValues>
          <ns1:obligatedAmount>{obligated}</ns1:obligatedAmount>
        </ns1:dollarValues>
        <ns1:contractData>
          <ns1:contractActionType description="DELIVERY ORDER">C</ns1:contractActionType>
          <ns1:descriptionOfContractRequirement>{description}</ns1:descriptionOfContractRequirement>
        </ns1:contractData>
        <ns1:vendor>
          <ns1:vendorHeader>
            <ns1:vendorName>ACME CORP</ns1:vendorName>
          </ns1:vendorHeader>
        </ns1:vendor>
      </ns1:award>
    </content>
  </entry>"#
    )
}

/// A feed page wrapping `entries`, with a `rel="next"` link when `has_next`
pub fn feed_page(entries: &[String], has_next: bool) -> String {
    let next = if has_next {
        r#"<link rel="next" type="application/atom+xml" href="https://www.fpds.gov/ezsearch/FEEDS/ATOM?start=10"/>"#
    } else {
        ""
    };
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="text">FPDS Federal Procurement Data System</title>
  {next}
  {}
</feed>"#,
        entries.join("\n")
    )
}
