//! Synthetic keyboard input for X11-based systems.
//!
//! Key events are injected with the XTEST extension. Key symbols are mapped
//! to keycodes once, from the server's keyboard mapping, when the injector is
//! created.

use crate::{
    emitter::KeyInjector,
    error::{Error, Result},
    keys::Key,
};
use log::{debug, info};
use std::collections::HashMap;
use x11rb::{
    connection::{Connection, RequestConnection},
    protocol::{
        xproto::{ConnectionExt as _, Keycode, Keysym, Window, KEY_PRESS_EVENT, KEY_RELEASE_EVENT},
        xtest::{self, ConnectionExt as _},
    },
    rust_connection::RustConnection,
    CURRENT_TIME,
};

/// X11 keysym for a key
#[must_use]
pub fn keysym(key: Key) -> Keysym {
    match key {
        Key::Ctrl => 0xffe3,
        Key::Shift => 0xffe1,
        Key::Alt => 0xffe9,
        Key::Tab => 0xff09,
        Key::Space => 0x0020,
        Key::End => 0xff57,
        Key::CapsLock => 0xffe5,
        Key::Esc => 0xff1b,
        Key::Enter => 0xff0d,
        // Latin-1 keysyms equal their code points; everything else lives in
        // the Unicode keysym range.
        Key::Char(c) => {
            let code = u32::from(c);
            if (0x20..=0xff).contains(&code) {
                code
            } else {
                0x0100_0000 | code
            }
        }
    }
}

/// Key injection through XTEST
pub struct X11KeyInjector {
    connection: RustConnection,
    root: Window,
    keycodes: HashMap<Keysym, Keycode>,
}

impl X11KeyInjector {
    /// Connect to the X server and load its keyboard mapping
    ///
    /// # Errors
    ///
    /// Returns `Error::X11` if the display is unreachable or lacks XTEST
    pub fn new() -> Result<Self> {
        info!("Initializing X11 key injector");

        let (connection, screen_num) = RustConnection::connect(None)
            .map_err(|e| Error::X11(format!("Failed to connect to X11: {e}")))?;

        let root = connection
            .setup()
            .roots
            .get(screen_num)
            .ok_or_else(|| Error::X11("Failed to get screen".to_string()))?
            .root;

        connection
            .extension_information(xtest::X11_EXTENSION_NAME)
            .map_err(|e| Error::X11(format!("Failed to query XTEST: {e}")))?
            .ok_or_else(|| Error::X11("XTEST extension not available".to_string()))?;

        let keycodes = Self::load_keycodes(&connection)?;
        info!("Connected to X11 display, {} keysyms mapped", keycodes.len());

        Ok(Self {
            connection,
            root,
            keycodes,
        })
    }

    fn load_keycodes(connection: &RustConnection) -> Result<HashMap<Keysym, Keycode>> {
        let setup = connection.setup();
        let min = setup.min_keycode;
        let count = setup.max_keycode.saturating_sub(min).saturating_add(1);

        let reply = connection
            .get_keyboard_mapping(min, count)
            .map_err(|e| Error::X11(format!("Failed to send keyboard mapping request: {e}")))?
            .reply()
            .map_err(|e| Error::X11(format!("Failed to get keyboard mapping: {e}")))?;

        let per_keycode = usize::from(reply.keysyms_per_keycode).max(1);
        let mut keycodes = HashMap::new();
        for (offset, syms) in reply.keysyms.chunks(per_keycode).enumerate() {
            let Ok(offset) = u8::try_from(offset) else { break };
            let keycode = min.saturating_add(offset);
            for &sym in syms.iter().filter(|&&sym| sym != 0) {
                keycodes.entry(sym).or_insert(keycode);
            }
        }
        Ok(keycodes)
    }

    fn keycode(&self, key: Key) -> Result<Keycode> {
        self.keycodes
            .get(&keysym(key))
            .copied()
            .ok_or_else(|| Error::Injection(format!("No keycode for {key}")))
    }

    fn send(&self, key: Key, event: u8) -> Result<()> {
        let keycode = self.keycode(key)?;
        debug!("XTEST event {} keycode {} ({})", event, keycode, key);

        self.connection
            .xtest_fake_input(event, keycode, CURRENT_TIME, self.root, 0, 0, 0)
            .map_err(|e| Error::Injection(format!("Failed to send fake input: {e}")))?;

        self.connection
            .flush()
            .map_err(|e| Error::Injection(format!("Failed to flush connection: {e}")))?;

        Ok(())
    }
}

impl KeyInjector for X11KeyInjector {
    fn press(&mut self, key: Key) -> Result<()> {
        self.send(key, KEY_PRESS_EVENT)
    }

    fn release(&mut self, key: Key) -> Result<()> {
        self.send(key, KEY_RELEASE_EVENT)
    }
}
