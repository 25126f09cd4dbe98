use crate::application::input::{
    parse_menu_choice, parse_result_choice, parse_scan_input, MenuChoice, ResultChoice, ScanInput,
};
use crate::camera::ManualEntryPlatform;
use crate::infrastructure::{CliError, Result};
use crate::presentation::console::{
    render_camera_error, render_header, render_menu, render_processing, render_scanning,
};
use crate::presentation::Console;
use dks_checkin_core::{
    ActivationController, ActivationType, CameraDevice, CameraPlatform, CommitPolicy,
    ParticipantStore, SamplingConfig, ScanControl, ScanExit, ScanOutcome, Screen,
};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::mpsc;

/// Counts for the goodbye line
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub scans: usize,
    pub eligible: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &ScanOutcome) {
        self.scans += 1;
        if outcome.eligible {
            self.eligible += 1;
        }
    }
}

/// Interactive staff loop over one [`ActivationController`]
///
/// All console input goes through this loop. In manual-entry mode, lines
/// typed on the scanning screen are forwarded to the capture as codes.
/// Ctrl+C or end of input leaves the loop; an open capture is cancelled
/// first so the camera is always released.
pub struct StaffConsole<P, S, R, W>
where
    P: CameraPlatform,
    S: ParticipantStore,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    controller: ActivationController<P, S>,
    rejections: mpsc::UnboundedReceiver<ScanOutcome>,
    manual: Option<ManualEntryPlatform>,
    input: Lines<R>,
    console: Console<W>,
    camera: Option<String>,
    once: bool,
    summary: RunSummary,
}

impl<P, S, R, W> StaffConsole<P, S, R, W>
where
    P: CameraPlatform,
    S: ParticipantStore,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(platform: P, store: S, input: R, out: W) -> Self {
        let (rejections_tx, rejections) = mpsc::unbounded_channel();
        Self {
            controller: ActivationController::new(platform, store).with_rejections(rejections_tx),
            rejections,
            manual: None,
            input: input.lines(),
            console: Console::new(out),
            camera: None,
            once: false,
            summary: RunSummary::default(),
        }
    }

    pub fn with_sampling(mut self, config: SamplingConfig) -> Self {
        self.controller = self.controller.with_sampling(config);
        self
    }

    pub fn with_commit_policy(mut self, policy: CommitPolicy) -> Self {
        self.controller = self.controller.with_commit_policy(policy);
        self
    }

    /// Forward typed codes to this platform while scanning
    pub fn with_manual_entry(mut self, manual: Option<ManualEntryPlatform>) -> Self {
        self.manual = manual;
        self
    }

    /// Preferred camera id; unknown ids fall back to the default camera
    pub fn with_camera(mut self, camera: Option<String>) -> Self {
        self.camera = camera;
        self
    }

    /// Stop after the first terminal outcome
    pub fn once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.console = self.console.with_json(json);
        self
    }

    pub fn into_output(self) -> W {
        self.console.into_inner()
    }

    /// Run until staff quit. `activation` skips the menu the first time.
    pub async fn run(&mut self, activation: Option<ActivationType>) -> Result<RunSummary> {
        self.console.say(&render_header())?;

        let mut preselected = activation;
        let result = loop {
            let step = match self.controller.session().screen() {
                Screen::SelectType => self.select_type(&mut preselected).await,
                Screen::Scanning => self.scanning().await,
                Screen::ShowingResult => self.showing_result().await,
            };
            match step {
                Ok(true) => continue,
                Ok(false) => break Ok(self.summary),
                Err(e) => break Err(e),
            }
        };

        self.controller.stop_capture().await;
        tracing::info!(
            "👋 Leaving after {} scan(s), {} eligible",
            self.summary.scans,
            self.summary.eligible
        );
        if result.is_ok() {
            self.console.say(&format!(
                "Encerrando. {} verificação(ões), {} liberada(s).",
                self.summary.scans, self.summary.eligible
            ))?;
        }
        result
    }

    async fn select_type(&mut self, preselected: &mut Option<ActivationType>) -> Result<bool> {
        if let Some(activation) = preselected.take() {
            self.controller.choose_activation(activation);
            return Ok(true);
        }

        self.console.say(&render_menu())?;
        let Some(line) = read_line(&mut self.input).await? else {
            return Ok(false);
        };

        match parse_menu_choice(&line) {
            Some(MenuChoice::Activation(activation)) => {
                self.controller.choose_activation(activation);
            }
            Some(MenuChoice::Quit) => return Ok(false),
            None => self.console.say("Opção inválida.")?,
        }
        Ok(true)
    }

    async fn scanning(&mut self) -> Result<bool> {
        if let Some(error) = self.controller.session().camera_error() {
            self.console.say(&render_camera_error(error))?;
            if self.once {
                return Err(CliError::Camera(error.clone()));
            }
            if read_line(&mut self.input).await?.is_none() {
                return Ok(false);
            }
            self.controller.change_activation().await;
            return Ok(true);
        }

        let Some(activation) = self.controller.session().activation() else {
            return Ok(false);
        };

        let Some(device_id) = self.controller.select_camera(self.camera.as_deref()).await? else {
            // The session now holds the error; the next step shows it
            return Ok(true);
        };
        let devices = self.controller.cameras().devices().to_vec();
        self.console.say(&render_scanning(
            activation,
            &devices,
            self.manual.is_some(),
        ))?;

        let (exit, quit) = self.scan_until_exit(&device_id, &devices).await?;
        match exit {
            ScanExit::Outcome(outcome) => {
                self.summary.record(&outcome);
                self.console.outcome(&outcome, activation)?;
                Ok(!self.once)
            }
            ScanExit::Cancelled | ScanExit::CameraFailed(_) if quit => Ok(false),
            ScanExit::Cancelled => {
                self.controller.change_activation().await;
                Ok(true)
            }
            // The session now holds the error; the next step shows it
            ScanExit::CameraFailed(_) => Ok(true),
        }
    }

    /// Drive one scan while routing console input. The flag is true when
    /// staff asked to leave the program.
    ///
    /// Input is only read while it can apply to this screen. After "voltar",
    /// while a code is being verified, or while a typed code waits for its
    /// verdict, lines stay buffered for the next screen.
    async fn scan_until_exit(
        &mut self,
        device_id: &str,
        devices: &[CameraDevice],
    ) -> Result<(ScanExit, bool)> {
        let (controls_tx, mut controls) = mpsc::channel(8);
        let mut states = self.controller.engine().subscribe();
        let mut processing = false;
        let mut awaiting_verdict = false;
        let mut quit = false;
        let mut input_open = true;

        let scan = self.controller.run_scan(device_id, &mut controls);
        tokio::pin!(scan);

        loop {
            tokio::select! {
                biased;

                exit = &mut scan => return Ok((exit?, quit)),

                Ok(()) = states.changed() => {
                    let now = states.borrow_and_update().is_processing();
                    if now && !processing {
                        self.console.say(render_processing())?;
                    }
                    processing = now;
                }

                Some(rejected) = self.rejections.recv() => {
                    awaiting_verdict = false;
                    self.console.rejection(&rejected)?;
                }

                line = self.input.next_line(), if input_open && !processing && !awaiting_verdict => match line {
                    Ok(Some(line)) => match parse_scan_input(&line, devices) {
                        Some(ScanInput::Back) => {
                            input_open = false;
                            let _ = controls_tx.try_send(ScanControl::Cancel);
                        }
                        Some(ScanInput::SwitchCamera(id)) => {
                            let _ = controls_tx.try_send(ScanControl::SwitchCamera(id));
                        }
                        Some(ScanInput::Code(code)) => match &self.manual {
                            Some(manual) => awaiting_verdict = manual.feed(&code),
                            None => self.console.say("Use a câmera para escanear. v) ← Voltar")?,
                        },
                        None => {}
                    },
                    Ok(None) | Err(_) => {
                        input_open = false;
                        quit = true;
                        match &self.manual {
                            // Let codes already typed or piped finish
                            Some(manual) => manual.finish(),
                            None => {
                                let _ = controls_tx.try_send(ScanControl::Cancel);
                            }
                        }
                    }
                },

                _ = tokio::signal::ctrl_c() => {
                    quit = true;
                    let _ = controls_tx.try_send(ScanControl::Cancel);
                }
            }
        }
    }

    async fn showing_result(&mut self) -> Result<bool> {
        let Some(line) = read_line(&mut self.input).await? else {
            return Ok(false);
        };

        match parse_result_choice(&line) {
            Some(ResultChoice::ScanNext) => {
                self.controller.scan_next();
            }
            Some(ResultChoice::ChangeActivation) => {
                self.controller.change_activation().await;
            }
            Some(ResultChoice::Quit) => return Ok(false),
            None => self.console.say("Opção inválida.")?,
        }
        Ok(true)
    }
}

/// Next console line; `None` on end of input or Ctrl+C
async fn read_line<R: AsyncBufRead + Unpin>(input: &mut Lines<R>) -> Result<Option<String>> {
    tokio::select! {
        line = input.next_line() => Ok(line?),
        _ = tokio::signal::ctrl_c() => Ok(None),
    }
}
