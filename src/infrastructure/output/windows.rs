//! Windows keystroke delivery.
//!
//! Two mechanisms, matching the dispatcher's failover order:
//!
//! - [`ForegroundCharInjector`] posts one `WM_CHAR` message per UTF-16 code
//!   unit directly to the foreground window — the low-level event-posting
//!   primitive. It also carries the best-effort IME-off request
//!   (`WM_IME_CONTROL` / `IMC_SETOPENSTATUS`) so composition does not swallow
//!   the literal characters.
//! - [`SendInputSimulator`] injects `KEYEVENTF_UNICODE` key-down/key-up pairs
//!   through `SendInput` — the higher-level simulate-typing primitive used
//!   when message posting fails.

#![cfg(target_os = "windows")]

use windows::Win32::Foundation::{HWND, LPARAM, WPARAM};
use windows::Win32::UI::Input::Ime::IMC_SETOPENSTATUS;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT, KEYBD_EVENT_FLAGS, KEYEVENTF_KEYUP,
    KEYEVENTF_UNICODE, VIRTUAL_KEY,
};
use windows::Win32::UI::WindowsAndMessaging::{
    GetForegroundWindow, PostMessageW, SendMessageW, WM_CHAR, WM_IME_CONTROL,
};

use crate::application::dispatch::{CharInjector, DispatchError, TypingSimulator};

/// Native injector posting `WM_CHAR` messages to the foreground window.
pub struct ForegroundCharInjector;

impl ForegroundCharInjector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ForegroundCharInjector {
    fn default() -> Self {
        Self::new()
    }
}

fn foreground_window() -> Result<HWND, DispatchError> {
    // SAFETY: GetForegroundWindow takes no arguments and is always safe to call.
    let hwnd = unsafe { GetForegroundWindow() };
    if hwnd.is_invalid() {
        return Err(DispatchError::Native("no foreground window".to_string()));
    }
    Ok(hwnd)
}

impl CharInjector for ForegroundCharInjector {
    fn suppress_ime(&self) -> Result<(), DispatchError> {
        let hwnd = foreground_window()?;
        // lParam 0 = closed: turn composition off before injecting literals.
        // SAFETY: hwnd is a live window handle obtained just above.
        unsafe {
            SendMessageW(hwnd, WM_IME_CONTROL, WPARAM(IMC_SETOPENSTATUS as usize), LPARAM(0));
        }
        Ok(())
    }

    fn post_chars(&self, text: &str) -> Result<(), DispatchError> {
        let hwnd = foreground_window()?;
        for unit in text.encode_utf16() {
            // SAFETY: hwnd is a live window handle; WM_CHAR carries the code
            // unit in wParam and needs no pointer arguments.
            unsafe {
                PostMessageW(hwnd, WM_CHAR, WPARAM(unit as usize), LPARAM(0))
                    .map_err(|e| DispatchError::Native(e.to_string()))?;
            }
        }
        Ok(())
    }
}

/// Fallback simulator injecting Unicode key events via `SendInput`.
pub struct SendInputSimulator;

impl SendInputSimulator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SendInputSimulator {
    fn default() -> Self {
        Self::new()
    }
}

fn unicode_key_event(unit: u16, flags: KEYBD_EVENT_FLAGS) -> INPUT {
    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(0),
                wScan: unit,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

impl TypingSimulator for SendInputSimulator {
    fn type_text(&self, text: &str) -> Result<(), DispatchError> {
        let inputs: Vec<INPUT> = text
            .encode_utf16()
            .flat_map(|unit| {
                [
                    unicode_key_event(unit, KEYEVENTF_UNICODE),
                    unicode_key_event(unit, KEYEVENTF_UNICODE | KEYEVENTF_KEYUP),
                ]
            })
            .collect();
        if inputs.is_empty() {
            return Ok(());
        }

        // SAFETY: inputs is a valid slice of INPUT structures on the stack.
        let injected = unsafe { SendInput(&inputs, std::mem::size_of::<INPUT>() as i32) };
        if injected as usize != inputs.len() {
            return Err(DispatchError::Simulation(
                windows::core::Error::from_win32().to_string(),
            ));
        }
        Ok(())
    }
}
