use dks_checkin_core::{ActivationType, CameraDevice};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Activation(ActivationType),
    Quit,
}

/// What a line typed on the scanning screen means
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanInput {
    Back,
    SwitchCamera(String),
    /// Anything else is treated as a scanned code
    Code(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultChoice {
    ScanNext,
    ChangeActivation,
    Quit,
}

fn is_quit(line: &str) -> bool {
    matches!(line, "q" | "sair")
}

/// Menu entries are 1-based, or an activation name
pub fn parse_menu_choice(line: &str) -> Option<MenuChoice> {
    let line = line.trim().to_lowercase();
    if is_quit(&line) {
        return Some(MenuChoice::Quit);
    }

    if let Ok(n) = line.parse::<usize>() {
        return n
            .checked_sub(1)
            .and_then(|i| ActivationType::ALL.get(i))
            .map(|activation| MenuChoice::Activation(*activation));
    }

    line.parse().ok().map(MenuChoice::Activation)
}

/// `c <n>` picks the n-th listed camera, `c <id>` a camera by id
pub fn parse_scan_input(line: &str, devices: &[CameraDevice]) -> Option<ScanInput> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if matches!(line.to_lowercase().as_str(), "v" | "voltar") {
        return Some(ScanInput::Back);
    }

    if let Some(wanted) = line.strip_prefix("c ").map(str::trim) {
        let by_index = wanted
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| devices.get(i));
        let device = by_index.or_else(|| devices.iter().find(|device| device.id == wanted));
        return device.map(|device| ScanInput::SwitchCamera(device.id.clone()));
    }

    Some(ScanInput::Code(line.to_string()))
}

/// Enter alone scans the next participant
pub fn parse_result_choice(line: &str) -> Option<ResultChoice> {
    let line = line.trim().to_lowercase();
    match line.as_str() {
        "" | "1" | "p" => Some(ResultChoice::ScanNext),
        "2" | "t" | "v" => Some(ResultChoice::ChangeActivation),
        other if is_quit(other) => Some(ResultChoice::Quit),
        _ => None,
    }
}
