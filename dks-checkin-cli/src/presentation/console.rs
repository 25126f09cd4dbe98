//! Plain-text screens for the staff console
//!
//! Every `render_*` function returns the text of one screen so it can be
//! asserted on directly. [`Console`] decides where that text goes.

use crate::infrastructure::Result;
use dks_checkin_core::{
    ActivationType, CameraDevice, CameraError, ResultView, ScanOutcome, Treatment,
};
use std::io::Write;

const RULE: &str = "────────────────────────────────────────";

pub fn render_header() -> String {
    format!("{}\n🎪 DKS Festival · Controle de Ativações\n{}", RULE, RULE)
}

pub fn render_menu() -> String {
    let mut lines = vec!["Qual ativação deseja verificar?".to_string()];
    for (i, activation) in ActivationType::ALL.iter().enumerate() {
        lines.push(format!(
            "  {}) {} {}",
            i + 1,
            activation.icon(),
            activation.label()
        ));
    }
    lines.push("  q) Sair".to_string());
    lines.join("\n")
}

/// Scanning screen. The camera list only appears when there is a choice.
pub fn render_scanning(
    activation: ActivationType,
    devices: &[CameraDevice],
    manual: bool,
) -> String {
    let mut lines = vec![
        format!("{} {}", activation.icon(), activation.label()),
        "📷 Escaneie o QR Code do participante".to_string(),
    ];

    if devices.len() > 1 {
        lines.push("Câmeras:".to_string());
        for (i, device) in devices.iter().enumerate() {
            lines.push(format!("  c {}) {}", i + 1, device.label));
        }
    }

    if manual {
        lines.push("Digite ou cole o código e pressione Enter.".to_string());
    }
    lines.push("v) ← Voltar".to_string());
    lines.join("\n")
}

pub fn render_processing() -> &'static str {
    "⏳ Verificando participante..."
}

pub fn render_camera_error(error: &CameraError) -> String {
    format!(
        "⚠️  {}\nPressione Enter para voltar.",
        error.staff_message()
    )
}

/// Unreadable code; scanning continues
pub fn render_rejection(outcome: &ScanOutcome) -> String {
    format!("❌ {}", outcome.message)
}

pub fn render_result(view: &ResultView) -> String {
    let status = match view.treatment {
        Treatment::Success => "LIBERADO",
        Treatment::Failure => "NÃO LIBERADO",
    };

    [
        RULE.to_string(),
        format!("{} {} · {}", view.treatment.icon(), status, view.headline),
        view.message.clone(),
        format!("{} {}", view.activation_icon, view.activation_label),
        RULE.to_string(),
        format!("  1) {}   2) {}   q) Sair", view.actions[0], view.actions[1]),
    ]
    .join("\n")
}

/// Device listing for the `cameras` command, marking the default pick
pub fn render_cameras(devices: &[CameraDevice], default_id: Option<&str>) -> String {
    if devices.is_empty() {
        return CameraError::NoCameraFound.staff_message().to_string();
    }

    devices
        .iter()
        .map(|device| {
            let marker = if Some(device.id.as_str()) == default_id {
                "*"
            } else {
                " "
            };
            format!("{} {:<10} {}", marker, device.id, device.label)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Where screens and outcomes are written
///
/// In JSON mode stdout carries one `ScanOutcome` object per line and the
/// prompts move to stderr.
pub struct Console<W: Write> {
    out: W,
    json: bool,
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Self {
        Self { out, json: false }
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    /// A prompt or screen
    pub fn say(&mut self, text: &str) -> Result<()> {
        if self.json {
            eprintln!("{}", text);
        } else {
            writeln!(self.out, "{}", text)?;
            self.out.flush()?;
        }
        Ok(())
    }

    pub fn outcome(&mut self, outcome: &ScanOutcome, activation: ActivationType) -> Result<()> {
        if self.json {
            self.json_line(outcome)
        } else {
            let view = dks_checkin_core::present(outcome, activation);
            self.say(&render_result(&view))
        }
    }

    pub fn rejection(&mut self, outcome: &ScanOutcome) -> Result<()> {
        if self.json {
            self.json_line(outcome)
        } else {
            self.say(&render_rejection(outcome))
        }
    }

    fn json_line(&mut self, outcome: &ScanOutcome) -> Result<()> {
        serde_json::to_writer(&mut self.out, outcome)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
