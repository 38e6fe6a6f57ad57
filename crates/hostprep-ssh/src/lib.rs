use hostprep_core::{AppError, CommandOutput};
use ssh2::Session;
use std::io::{ErrorKind, Read};
use std::net::{IpAddr, SocketAddr, TcpStream};
use std::path::Path;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Connect to a remote host as root using a private key file.
fn connect(ip: &str, private_key_path: &Path) -> Result<Session, AppError> {
    // Bare IPs get port 22; `ip:port` is taken as given.
    let sock_addr = match ip.parse::<IpAddr>() {
        Ok(addr) => SocketAddr::new(addr, 22),
        Err(_) => ip
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Ssh(format!("Invalid address {ip}: {e}")))?,
    };

    let tcp = TcpStream::connect_timeout(&sock_addr, CONNECT_TIMEOUT)
        .map_err(|e| AppError::Ssh(format!("TCP connect to {ip}: {e}")))?;

    // Bounds the handshake; exec clears it for long-running commands.
    let mut sess = Session::new().map_err(|e| AppError::Ssh(format!("Session::new: {e}")))?;
    sess.set_timeout(CONNECT_TIMEOUT.as_millis() as u32);
    sess.set_tcp_stream(tcp);
    sess.handshake()
        .map_err(|e| AppError::Ssh(format!("SSH handshake with {ip}: {e}")))?;

    sess.userauth_pubkey_file("root", None, private_key_path, None)
        .map_err(|e| AppError::Ssh(format!("SSH auth to {ip}: {e}")))?;

    Ok(sess)
}

/// Execute a command on the remote host under `bash -c`.
///
/// A non-zero exit status is returned in the [`CommandOutput`]; only
/// transport failures are errors.
pub fn exec(ip: &str, private_key_path: &Path, command: &str) -> Result<CommandOutput, AppError> {
    let sess = connect(ip, private_key_path)?;
    // apt upgrades and nvm installs run for minutes.
    sess.set_timeout(0);

    let mut channel = sess
        .channel_session()
        .map_err(|e| AppError::Ssh(format!("Open channel: {e}")))?;

    channel
        .exec(&format!("bash -c {}", shell_escape(command)))
        .map_err(|e| AppError::Ssh(format!("Exec command: {e}")))?;

    // Alternate between both streams so a chatty stderr cannot fill the
    // channel window while stdout is blocked on.
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    sess.set_blocking(false);
    while !channel.eof() {
        let out = drain(&mut channel, &mut stdout)?;
        let err = drain(&mut channel.stderr(), &mut stderr)?;
        if !out && !err {
            std::thread::sleep(POLL_INTERVAL);
        }
    }
    sess.set_blocking(true);
    drain(&mut channel, &mut stdout)?;
    drain(&mut channel.stderr(), &mut stderr)?;

    channel
        .wait_close()
        .map_err(|e| AppError::Ssh(format!("Wait close: {e}")))?;

    let status = channel.exit_status().unwrap_or(-1);

    Ok(CommandOutput {
        status,
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
    })
}

/// Read whatever `reader` has ready into `out`. Returns whether anything was
/// read; stops at EOF or when a non-blocking read would block.
fn drain(reader: &mut impl Read, out: &mut Vec<u8>) -> Result<bool, AppError> {
    let mut buf = [0u8; 8192];
    let mut progressed = false;
    loop {
        match reader.read(&mut buf) {
            Ok(0) => return Ok(progressed),
            Ok(n) => {
                out.extend_from_slice(&buf[..n]);
                progressed = true;
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(progressed),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(AppError::Ssh(format!("Read output: {e}"))),
        }
    }
}

/// Shell-escape a string as a single-quoted word.
pub fn shell_escape(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}
