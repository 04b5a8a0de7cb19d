//! # Design CLI
//!
//! Command-line host for the design editor.
//!
//! ## Usage
//!
//! ```bash
//! # Replay an edit script and export a PNG
//! design render --script edits.json --out-dir out/
//!
//! # Same, with the product photo as background
//! design --api-url https://shop.example.com/api render --script edits.json --product-id 12
//!
//! # Submit a saved design as an order
//! design --api-url https://shop.example.com/api submit --design out/design.json \
//!     --product-id 12 --size S=2 --size M=3 --customer-name "Ada" \
//!     --customer-email ada@example.com --customer-phone 5550100
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `CliConfig` - Settings shared by every subcommand
//! - `script` - JSON edit scripts replayed against `EditorState`

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

pub mod script;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use design_core::CanvasSize;
use design_order::{CustomerInfo, InvoiceInfo, OrderDetails, SizeEntry, SizeQuantities};
use design_renderer::ExportConfig;

/// Command-line arguments for the design tool.
#[derive(Debug, Clone, Parser)]
#[command(name = "design")]
#[command(about = "Compose product designs, export them and place orders")]
#[command(version)]
pub struct CliArgs {
    /// Backend base URL (e.g., <https://shop.example.com/api>)
    #[arg(long, global = true, env = "DESIGN_API_URL")]
    pub api_url: Option<String>,

    /// Log output format
    #[arg(long, global = true, env = "RUST_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Give up on an export or submission after this many seconds
    #[arg(long, global = true, env = "DESIGN_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Skip loading installed fonts (text elements will not render)
    #[arg(long, global = true)]
    pub no_system_fonts: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per line.
    Json,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Build a design from a script and export it as PNG
    Render(RenderArgs),
    /// Submit a saved design as an order
    Submit(SubmitArgs),
}

/// Arguments for `render`.
#[derive(Debug, Clone, Args)]
pub struct RenderArgs {
    /// JSON edit script to replay
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Saved design to start from
    #[arg(long)]
    pub design: Option<PathBuf>,

    /// Directory for the exported PNG
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Product the design is for
    #[arg(long)]
    pub product_id: Option<u64>,

    /// Where to save the resulting design document
    #[arg(long)]
    pub save_design: Option<PathBuf>,

    /// Canvas width for a new design
    #[arg(long, default_value = "500")]
    pub canvas_width: f32,

    /// Canvas height for a new design
    #[arg(long, default_value = "600")]
    pub canvas_height: f32,
}

/// Arguments for `submit`.
#[derive(Debug, Clone, Args)]
pub struct SubmitArgs {
    /// Saved design to submit
    #[arg(long)]
    pub design: PathBuf,

    /// Product being ordered
    #[arg(long)]
    pub product_id: u64,

    /// Quantity per size, as SIZE=QTY (repeatable)
    #[arg(long = "size", required = true)]
    pub sizes: Vec<SizeEntry>,

    /// Customer name
    #[arg(long)]
    pub customer_name: String,

    /// Customer email
    #[arg(long, default_value = "")]
    pub customer_email: String,

    /// Customer phone
    #[arg(long, default_value = "")]
    pub customer_phone: String,

    /// Delivery address
    #[arg(long, default_value = "")]
    pub customer_address: String,

    /// Company name for the invoice (enables invoice fields)
    #[arg(long)]
    pub invoice_company: Option<String>,

    /// Tax office for the invoice
    #[arg(long, default_value = "")]
    pub invoice_tax_office: String,

    /// Tax number for the invoice
    #[arg(long, default_value = "")]
    pub invoice_tax_number: String,

    /// Billing address for the invoice
    #[arg(long, default_value = "")]
    pub invoice_address: String,

    /// Notes for the order
    #[arg(long)]
    pub notes: Option<String>,
}

impl RenderArgs {
    /// Canvas size for a design that does not come from a file.
    #[must_use]
    pub fn canvas(&self) -> CanvasSize {
        CanvasSize::new(self.canvas_width, self.canvas_height)
    }
}

impl SubmitArgs {
    /// Requested quantities.
    #[must_use]
    pub fn size_quantities(&self) -> SizeQuantities {
        self.sizes.iter().cloned().collect()
    }

    /// Customer, invoice and notes as order fields.
    #[must_use]
    pub fn order_details(&self) -> OrderDetails {
        OrderDetails {
            customer: CustomerInfo {
                name: self.customer_name.clone(),
                email: self.customer_email.clone(),
                phone: self.customer_phone.clone(),
                address: self.customer_address.clone(),
            },
            invoice: self.invoice_company.as_ref().map(|company| InvoiceInfo {
                company_name: company.clone(),
                tax_office: self.invoice_tax_office.clone(),
                tax_number: self.invoice_tax_number.clone(),
                address: self.invoice_address.clone(),
            }),
            notes: self.notes.clone(),
        }
    }
}

/// Settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Backend base URL.
    pub api_url: Option<String>,
    /// Log output format.
    pub log_format: LogFormat,
    /// Per-operation timeout.
    pub timeout: Option<Duration>,
    /// Load installed fonts for text rendering.
    pub load_system_fonts: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            log_format: LogFormat::Text,
            timeout: None,
            load_system_fonts: true,
        }
    }
}

impl CliConfig {
    /// Exporter settings derived from this configuration.
    #[must_use]
    pub fn export_config(&self) -> ExportConfig {
        ExportConfig {
            load_system_fonts: self.load_system_fonts,
            ..ExportConfig::default()
        }
    }
}

impl From<&CliArgs> for CliConfig {
    fn from(args: &CliArgs) -> Self {
        Self {
            api_url: args.api_url.clone().filter(|u| !u.trim().is_empty()),
            log_format: args.log_format,
            timeout: args.timeout_secs.map(Duration::from_secs),
            load_system_fonts: !args.no_system_fonts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_defaults() {
        let args = CliArgs::try_parse_from(["design", "render", "--script", "edits.json"])
            .expect("parse");
        let config = CliConfig::from(&args);
        assert!(config.api_url.is_none());
        assert!(config.timeout.is_none());
        assert!(config.load_system_fonts);

        let Command::Render(render) = args.command else {
            panic!("expected render");
        };
        assert_eq!(render.canvas(), CanvasSize::new(500.0, 600.0));
        assert_eq!(render.out_dir, PathBuf::from("."));
    }

    #[test]
    fn test_submit_sizes_and_invoice() {
        let args = CliArgs::try_parse_from([
            "design",
            "--api-url",
            "http://localhost:8080/api",
            "--timeout-secs",
            "30",
            "submit",
            "--design",
            "d.json",
            "--product-id",
            "12",
            "--size",
            "S=2",
            "--size",
            "M=0",
            "--customer-name",
            "Ada",
            "--invoice-company",
            "Acme",
        ])
        .expect("parse");
        let config = CliConfig::from(&args);
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));

        let Command::Submit(submit) = args.command else {
            panic!("expected submit");
        };
        let sizes = submit.size_quantities();
        assert_eq!(sizes.total(), 2);
        let details = submit.order_details();
        assert_eq!(details.customer.name, "Ada");
        assert_eq!(
            details.invoice.map(|i| i.company_name),
            Some("Acme".to_string())
        );
    }

    #[test]
    fn test_submit_requires_size() {
        let result = CliArgs::try_parse_from([
            "design",
            "submit",
            "--design",
            "d.json",
            "--product-id",
            "1",
            "--customer-name",
            "Ada",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_size_rejected() {
        let result = CliArgs::try_parse_from([
            "design",
            "submit",
            "--design",
            "d.json",
            "--product-id",
            "1",
            "--size",
            "large",
            "--customer-name",
            "Ada",
        ]);
        assert!(result.is_err());
    }
}
