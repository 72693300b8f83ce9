use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use log::info;
use tokio::process::Command;

/// A detail field reported for one port. Script results carry their own
/// key/value pairs and render one indent level deeper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailValue {
    Text(String),
    Nested(Vec<(String, String)>),
}

#[derive(Debug, Clone, Default)]
pub struct PortRecord {
    pub state: String,
    pub details: Vec<(String, DetailValue)>,
}

/// Per-host scan result: TCP port number to service metadata. Written once
/// per host and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub ports: BTreeMap<u16, PortRecord>,
}

impl ScanReport {
    pub fn is_open(&self, port: u16) -> bool {
        self.ports.get(&port).is_some_and(|r| r.state == "open")
    }

    /// Renders the report artifact: `Port: <n>`, one indented
    /// `<detail>: <value>` line per detail, nested values indented one level
    /// further, one blank line between ports.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (port, record) in &self.ports {
            out.push_str(&format!("Port: {port}\n"));
            out.push_str(&format!(" state: {}\n", record.state));
            for (name, value) in &record.details {
                match value {
                    DetailValue::Text(v) => {
                        out.push_str(&format!(" {name}: {v}\n"));
                    }
                    DetailValue::Nested(entries) => {
                        out.push_str(&format!(" {name}:\n"));
                        for (key, v) in entries {
                            out.push_str(&format!("  {key}: {v}\n"));
                        }
                    }
                }
            }
            out.push('\n');
        }
        out
    }
}

/// Narrow interface to the external service-detection scanner. The
/// orchestrator only needs one shot: scan a host over a port range and hand
/// back the structured result.
#[async_trait]
pub trait PortScanner: Send + Sync {
    async fn scan(&self, ip: &str, ports: &str) -> Result<ScanReport>;
}

/// Shells out to the nmap binary with script and version detection enabled
/// and parses its XML output.
pub struct NmapScanner;

#[async_trait]
impl PortScanner for NmapScanner {
    async fn scan(&self, ip: &str, ports: &str) -> Result<ScanReport> {
        info!("scanning {ip} ports {ports} with nmap -sC -sV");

        let output = Command::new("nmap")
            .args(["-sC", "-sV", "-p", ports, "-oX", "-", ip])
            .output()
            .await
            .context("failed to launch nmap (is it installed?)")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("nmap exited with {}: {}", output.status, stderr.trim());
        }

        let xml = String::from_utf8_lossy(&output.stdout);
        parse_nmap_xml(&xml)
    }
}

/// Extracts the TCP port table from an nmap `-oX` document. Service
/// attributes become flat details; script results become one nested detail.
pub fn parse_nmap_xml(xml: &str) -> Result<ScanReport> {
    let doc = roxmltree::Document::parse(xml).context("malformed nmap XML output")?;
    let mut ports = BTreeMap::new();

    for port_node in doc.descendants().filter(|n| n.has_tag_name("port")) {
        if port_node.attribute("protocol") != Some("tcp") {
            continue;
        }
        let Some(portid) = port_node.attribute("portid").and_then(|p| p.parse::<u16>().ok())
        else {
            continue;
        };

        let mut record = PortRecord::default();

        if let Some(state) = port_node.children().find(|n| n.has_tag_name("state")) {
            record.state = state.attribute("state").unwrap_or("unknown").to_string();
            if let Some(reason) = state.attribute("reason") {
                record
                    .details
                    .push(("reason".to_string(), DetailValue::Text(reason.to_string())));
            }
        }

        if let Some(service) = port_node.children().find(|n| n.has_tag_name("service")) {
            for field in ["name", "product", "version", "extrainfo"] {
                if let Some(v) = service.attribute(field) {
                    record
                        .details
                        .push((field.to_string(), DetailValue::Text(v.to_string())));
                }
            }
            let cpes: Vec<String> = service
                .children()
                .filter(|n| n.has_tag_name("cpe"))
                .filter_map(|n| n.text())
                .map(str::to_string)
                .collect();
            if !cpes.is_empty() {
                record
                    .details
                    .push(("cpe".to_string(), DetailValue::Text(cpes.join(", "))));
            }
        }

        let scripts: Vec<(String, String)> = port_node
            .children()
            .filter(|n| n.has_tag_name("script"))
            .filter_map(|n| {
                let id = n.attribute("id")?;
                let output = n.attribute("output")?;
                Some((id.to_string(), output.trim().replace('\n', " ")))
            })
            .collect();
        if !scripts.is_empty() {
            record
                .details
                .push(("script".to_string(), DetailValue::Nested(scripts)));
        }

        ports.insert(portid, record);
    }

    Ok(ScanReport { ports })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<nmaprun scanner="nmap">
  <host>
    <address addr="10.10.10.191" addrtype="ipv4"/>
    <ports>
      <port protocol="tcp" portid="22">
        <state state="open" reason="syn-ack" reason_ttl="63"/>
        <service name="ssh" product="OpenSSH" version="8.2p1" method="probed" conf="10">
          <cpe>cpe:/a:openbsd:openssh:8.2p1</cpe>
        </service>
        <script id="ssh-hostkey" output="3072 aa:bb:cc (RSA)"/>
      </port>
      <port protocol="tcp" portid="80">
        <state state="open" reason="syn-ack" reason_ttl="63"/>
        <service name="http" product="Apache httpd" version="2.4.41" method="probed" conf="10"/>
        <script id="http-title" output="Welcome"/>
        <script id="http-server-header" output="Apache/2.4.41 (Ubuntu)"/>
      </port>
      <port protocol="tcp" portid="443">
        <state state="closed" reason="conn-refused" reason_ttl="0"/>
        <service name="https" method="table" conf="3"/>
      </port>
    </ports>
  </host>
</nmaprun>
"#;

    #[test]
    fn test_parse_ports_and_services() {
        let report = parse_nmap_xml(SAMPLE_XML).unwrap();
        assert_eq!(report.ports.len(), 3);

        let ssh = &report.ports[&22];
        assert_eq!(ssh.state, "open");
        assert!(ssh
            .details
            .contains(&("product".to_string(), DetailValue::Text("OpenSSH".to_string()))));

        let http = &report.ports[&80];
        let scripts = http
            .details
            .iter()
            .find(|(name, _)| name == "script")
            .map(|(_, v)| v)
            .unwrap();
        match scripts {
            DetailValue::Nested(entries) => {
                assert_eq!(entries.len(), 2);
                assert_eq!(entries[0].0, "http-title");
            }
            DetailValue::Text(_) => panic!("script results should be nested"),
        }
    }

    #[test]
    fn test_is_open_requires_open_state() {
        let report = parse_nmap_xml(SAMPLE_XML).unwrap();
        assert!(report.is_open(80));
        assert!(!report.is_open(443));
        assert!(!report.is_open(8080));
    }

    #[test]
    fn test_render_format() {
        let mut report = ScanReport::default();
        report.ports.insert(
            80,
            PortRecord {
                state: "open".to_string(),
                details: vec![
                    ("name".to_string(), DetailValue::Text("http".to_string())),
                    (
                        "script".to_string(),
                        DetailValue::Nested(vec![("http-title".to_string(), "Welcome".to_string())]),
                    ),
                ],
            },
        );

        let rendered = report.render();
        let expected = "Port: 80\n state: open\n name: http\n script:\n  http-title: Welcome\n\n";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_nmap_xml("not xml at all <<<").is_err());
    }
}
