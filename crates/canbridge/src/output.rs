use std::io::IsTerminal;

use canbridge_decode::DecoderIds;
use canbridge_router::ObserverFormat;
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use crate::config::BridgeSettings;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Text,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }

    /// Frame lines stay text unless JSON is asked for, wherever stdout goes.
    pub fn for_frames(requested: Option<Self>) -> Self {
        requested.unwrap_or(Self::Text)
    }

    /// Reports follow the terminal when no format is given.
    pub fn for_reports(requested: Option<Self>) -> Self {
        requested.unwrap_or_else(Self::default_for_stdout)
    }

    /// Frame lines have no tabular form; `table` prints them as text.
    pub fn observer_format(self) -> ObserverFormat {
        match self {
            OutputFormat::Json => ObserverFormat::Json,
            OutputFormat::Table | OutputFormat::Text => ObserverFormat::Text,
        }
    }
}

#[derive(Serialize)]
struct LinkOutput<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    bitrate: Option<u32>,
    forwards_to: Vec<&'a str>,
}

#[derive(Serialize)]
struct TopologyOutput<'a> {
    policy: &'static str,
    links: Vec<LinkOutput<'a>>,
    poll_timeout_ms: u128,
    settle_delay_ms: u128,
    decoders: DecoderIds,
}

pub fn print_topology(settings: &BridgeSettings, format: OutputFormat) {
    let table = &settings.table;
    let links: Vec<LinkOutput<'_>> = settings
        .links
        .iter()
        .enumerate()
        .map(|(index, link)| LinkOutput {
            name: &link.name,
            bitrate: link.bitrate,
            forwards_to: table
                .destinations(index)
                .iter()
                .map(|&dst| table.name(dst))
                .collect(),
        })
        .collect();

    match format {
        OutputFormat::Json => {
            let out = TopologyOutput {
                policy: settings.policy.name(),
                links,
                poll_timeout_ms: settings.poll_timeout.as_millis(),
                settle_delay_ms: settings.settle_delay.as_millis(),
                decoders: settings.decoders,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut out = Table::new();
            out.load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["LINK", "BITRATE", "FORWARDS TO"]);
            for link in &links {
                out.add_row(vec![
                    link.name.to_string(),
                    bitrate_label(link.bitrate),
                    destinations_label(&link.forwards_to),
                ]);
            }
            println!("policy: {}", settings.policy.name());
            println!("{out}");
        }
        OutputFormat::Text => {
            println!("policy: {}", settings.policy.name());
            for link in &links {
                println!(
                    "{} ({}) -> {}",
                    link.name,
                    bitrate_label(link.bitrate),
                    destinations_label(&link.forwards_to)
                );
            }
        }
    }
}

fn bitrate_label(bitrate: Option<u32>) -> String {
    match bitrate {
        Some(rate) => rate.to_string(),
        None => "unchanged".to_string(),
    }
}

fn destinations_label(destinations: &[&str]) -> String {
    if destinations.is_empty() {
        "-".to_string()
    } else {
        destinations.join(", ")
    }
}
