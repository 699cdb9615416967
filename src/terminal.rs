//! Terminal handling with raw ANSI escape sequences

use std::io::{self, Read, Write};
use std::os::unix::io::AsRawFd;

/// Cell colour. Named entries are the basic ANSI palette, themes use `Rgb`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Color {
    Black,
    Blue,
    Green,
    Cyan,
    Red,
    Magenta,
    Yellow,
    Gray,
    White,
    Rgb(u8, u8, u8),
}

impl Color {
    pub fn to_rgb(self) -> (u8, u8, u8) {
        match self {
            Color::Black => (0x00, 0x00, 0x00),
            Color::Blue => (0x00, 0x00, 0xAA),
            Color::Green => (0x00, 0xAA, 0x00),
            Color::Cyan => (0x00, 0xAA, 0xAA),
            Color::Red => (0xAA, 0x00, 0x00),
            Color::Magenta => (0xAA, 0x00, 0xAA),
            Color::Yellow => (0xFF, 0xFF, 0x55),
            Color::Gray => (0xAA, 0xAA, 0xAA),
            Color::White => (0xFF, 0xFF, 0xFF),
            Color::Rgb(r, g, b) => (r, g, b),
        }
    }

    /// ANSI SGR foreground code (true color)
    pub fn to_fg_sgr(self) -> String {
        let (r, g, b) = self.to_rgb();
        format!("38;2;{};{};{}", r, g, b)
    }

    /// ANSI SGR background code (true color)
    pub fn to_bg_sgr(self) -> String {
        let (r, g, b) = self.to_rgb();
        format!("48;2;{};{};{}", r, g, b)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    WheelUp,
    WheelDown,
    None,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MouseEvent {
    pub button: MouseButton,
    pub row: u16,
    pub col: u16,
    pub pressed: bool,
}

/// Key events including special keys
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Delete,
    Tab,
    ShiftTab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    CtrlHome,
    CtrlEnd,
    F(u8),
    Ctrl(char),
    Mouse(MouseEvent),
    Unknown(Vec<u8>),
}

/// Original terminal settings for restoration
static mut ORIG_TERMIOS: Option<libc::termios> = None;

/// Terminal state manager
pub struct Terminal {
    stdout: io::Stdout,
    width: u16,
    height: u16,
}

impl Terminal {
    /// Initialize terminal in raw mode
    pub fn new() -> io::Result<Self> {
        let mut term = Self {
            stdout: io::stdout(),
            width: 80,
            height: 25,
        };

        term.update_size();
        term.enable_raw_mode()?;

        term.write_raw("\x1b[?1049h")?; // Alternate screen
        term.write_raw("\x1b[?25l")?; // Hide cursor
        term.write_raw("\x1b[?1000h")?; // Button mouse tracking
        term.write_raw("\x1b[?1006h")?; // SGR extended mouse mode
        term.clear()?;
        term.flush()?;

        tracing::debug!("terminal opened at {}x{}", term.width, term.height);
        Ok(term)
    }

    /// Terminal dimensions (columns, rows)
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Update terminal size from ioctl
    pub fn update_size(&mut self) {
        unsafe {
            let mut ws: libc::winsize = std::mem::zeroed();
            if libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) == 0 && ws.ws_col > 0 {
                self.width = ws.ws_col;
                self.height = ws.ws_row;
            }
        }
    }

    fn enable_raw_mode(&self) -> io::Result<()> {
        unsafe {
            let fd = io::stdin().as_raw_fd();
            let mut termios: libc::termios = std::mem::zeroed();

            if libc::tcgetattr(fd, &mut termios) != 0 {
                return Err(io::Error::last_os_error());
            }

            ORIG_TERMIOS = Some(termios);

            termios.c_lflag &= !(libc::ECHO | libc::ICANON | libc::ISIG | libc::IEXTEN);
            termios.c_iflag &= !(libc::IXON | libc::ICRNL | libc::BRKINT | libc::INPCK | libc::ISTRIP);
            termios.c_oflag &= !libc::OPOST;
            termios.c_cflag |= libc::CS8;

            // VMIN=0, VTIME=0: reads never block
            termios.c_cc[libc::VMIN] = 0;
            termios.c_cc[libc::VTIME] = 0;

            if libc::tcsetattr(fd, libc::TCSAFLUSH, &termios) != 0 {
                return Err(io::Error::last_os_error());
            }
        }
        Ok(())
    }

    fn disable_raw_mode(&self) -> io::Result<()> {
        unsafe {
            if let Some(orig) = ORIG_TERMIOS {
                let fd = io::stdin().as_raw_fd();
                if libc::tcsetattr(fd, libc::TCSAFLUSH, &orig) != 0 {
                    return Err(io::Error::last_os_error());
                }
            }
        }
        Ok(())
    }

    pub fn write_raw(&mut self, s: &str) -> io::Result<()> {
        self.stdout.write_all(s.as_bytes())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }

    /// Move cursor to position (1-based, like ANSI)
    pub fn goto(&mut self, row: u16, col: u16) -> io::Result<()> {
        write!(self.stdout, "\x1b[{};{}H", row, col)
    }

    pub fn reset_colors(&mut self) -> io::Result<()> {
        self.write_raw("\x1b[0m")
    }

    pub fn clear(&mut self) -> io::Result<()> {
        self.write_raw("\x1b[2J\x1b[H")
    }

    pub fn show_cursor(&mut self) -> io::Result<()> {
        self.write_raw("\x1b[?25h")
    }

    pub fn hide_cursor(&mut self) -> io::Result<()> {
        self.write_raw("\x1b[?25l")
    }

    pub fn set_cursor_style(&mut self, style: CursorStyle) -> io::Result<()> {
        let code = match style {
            CursorStyle::BlinkingBar => "\x1b[5 q",
            CursorStyle::SteadyBlock => "\x1b[2 q",
        };
        self.write_raw(code)
    }

    /// Read one key without blocking
    pub fn read_key(&self) -> io::Result<Option<Key>> {
        let mut buf = [0u8; 32];
        let mut stdin = io::stdin();

        let n = stdin.read(&mut buf)?;
        if n == 0 {
            return Ok(None);
        }

        // A lone ESC may be the start of a sequence still in flight
        let mut total = n;
        if buf[0] == 0x1b && n == 1 {
            std::thread::sleep(std::time::Duration::from_millis(10));
            if let Ok(more) = stdin.read(&mut buf[n..]) {
                total += more;
            }
        }

        let key = parse_key(&buf[..total]);
        if let Key::Unknown(bytes) = &key {
            tracing::trace!("unrecognised key sequence {:?}", bytes);
        }
        Ok(Some(key))
    }
}

/// Parse raw bytes into a Key
pub fn parse_key(buf: &[u8]) -> Key {
    if buf.len() >= 6 && buf.starts_with(b"\x1b[<") {
        if let Some(mouse) = parse_sgr_mouse(buf) {
            return Key::Mouse(mouse);
        }
    }

    match buf {
        [b'\r'] | [b'\n'] => Key::Enter,
        [0x1b] => Key::Escape,
        [0x7f] | [0x08] => Key::Backspace,
        [b'\t'] => Key::Tab,

        // 0x01-0x1a = Ctrl+A through Ctrl+Z
        [c] if (1..=26).contains(c) => Key::Ctrl((b'a' + c - 1) as char),

        [c] if (32..127).contains(c) => Key::Char(*c as char),

        _ if buf.len() >= 2 && buf[0] >= 0xC0 => std::str::from_utf8(buf)
            .ok()
            .and_then(|s| s.chars().next())
            .map(Key::Char)
            .unwrap_or_else(|| Key::Unknown(buf.to_vec())),

        [0x1b, b'[', b'Z'] => Key::ShiftTab,

        [0x1b, b'[', b'A'] => Key::Up,
        [0x1b, b'[', b'B'] => Key::Down,
        [0x1b, b'[', b'C'] => Key::Right,
        [0x1b, b'[', b'D'] => Key::Left,
        [0x1b, b'[', b'H'] | [0x1b, b'[', b'1', b'~'] => Key::Home,
        [0x1b, b'[', b'F'] | [0x1b, b'[', b'4', b'~'] => Key::End,
        [0x1b, b'[', b'3', b'~'] => Key::Delete,
        [0x1b, b'[', b'5', b'~'] => Key::PageUp,
        [0x1b, b'[', b'6', b'~'] => Key::PageDown,
        [0x1b, b'[', b'1', b';', b'5', b'H'] => Key::CtrlHome,
        [0x1b, b'[', b'1', b';', b'5', b'F'] => Key::CtrlEnd,

        [0x1b, b'O', b'P'] | [0x1b, b'[', b'1', b'1', b'~'] => Key::F(1),
        [0x1b, b'O', b'Q'] | [0x1b, b'[', b'1', b'2', b'~'] => Key::F(2),
        [0x1b, b'O', b'R'] | [0x1b, b'[', b'1', b'3', b'~'] => Key::F(3),
        [0x1b, b'O', b'S'] | [0x1b, b'[', b'1', b'4', b'~'] => Key::F(4),
        [0x1b, b'[', b'1', b'5', b'~'] => Key::F(5),
        [0x1b, b'[', b'1', b'7', b'~'] => Key::F(6),

        _ => Key::Unknown(buf.to_vec()),
    }
}

/// Parse SGR extended mouse format: \x1b[<Cb;Cx;CyM or \x1b[<Cb;Cx;Cym
fn parse_sgr_mouse(buf: &[u8]) -> Option<MouseEvent> {
    let s = std::str::from_utf8(buf).ok()?;
    let content = s.strip_prefix("\x1b[<")?;
    let pressed = content.ends_with('M');
    let content = content.trim_end_matches(['M', 'm']);

    let mut parts = content.split(';');
    let cb: u8 = parts.next()?.parse().ok()?;
    let col: u16 = parts.next()?.parse().ok()?;
    let row: u16 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }

    let button = if cb & 64 != 0 {
        if cb & 1 != 0 {
            MouseButton::WheelDown
        } else {
            MouseButton::WheelUp
        }
    } else {
        match cb & 0b11 {
            0 => MouseButton::Left,
            1 => MouseButton::Middle,
            2 => MouseButton::Right,
            _ => MouseButton::None,
        }
    };

    Some(MouseEvent {
        button,
        row,
        col,
        pressed,
    })
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.write_raw("\x1b[?1006l");
        let _ = self.write_raw("\x1b[?1000l");
        let _ = self.write_raw("\x1b[0 q");
        let _ = self.show_cursor();
        let _ = self.reset_colors();
        let _ = self.write_raw("\x1b[?1049l");
        let _ = self.flush();
        let _ = self.disable_raw_mode();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorStyle {
    BlinkingBar,
    SteadyBlock,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_keys() {
        assert_eq!(parse_key(b"\x1b[15~"), Key::F(5));
        assert_eq!(parse_key(b"\x1b[17~"), Key::F(6));
    }

    #[test]
    fn test_control_letters() {
        assert_eq!(parse_key(&[0x13]), Key::Ctrl('s'));
        assert_eq!(parse_key(&[0x11]), Key::Ctrl('q'));
        assert_eq!(parse_key(b"\r"), Key::Enter);
        assert_eq!(parse_key(b"\t"), Key::Tab);
    }

    #[test]
    fn test_utf8_char() {
        assert_eq!(parse_key("é".as_bytes()), Key::Char('é'));
    }

    #[test]
    fn test_sgr_mouse() {
        let Key::Mouse(event) = parse_key(b"\x1b[<0;12;5M") else {
            panic!("expected mouse event");
        };
        assert_eq!(event.button, MouseButton::Left);
        assert_eq!((event.row, event.col), (5, 12));
        assert!(event.pressed);

        let Key::Mouse(wheel) = parse_key(b"\x1b[<65;1;1M") else {
            panic!("expected mouse event");
        };
        assert_eq!(wheel.button, MouseButton::WheelDown);
    }

    #[test]
    fn test_rgb_sgr() {
        assert_eq!(Color::Rgb(1, 2, 3).to_fg_sgr(), "38;2;1;2;3");
        assert_eq!(Color::White.to_bg_sgr(), "48;2;255;255;255");
    }
}
