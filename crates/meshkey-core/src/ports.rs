//! Port number table
//!
//! Port numbers name the application a packet payload belongs to. The
//! table below covers the ports this decoder knows how to talk about;
//! anything else still gets a printable `PORT_<n>` label.

/// Port carrying plain-text chat messages; payloads decode as UTF-8.
pub const TEXT_MESSAGE: u8 = 1;

/// Ports with a known application behind them.
pub const KNOWN_PORTS: [u8; 12] = [1, 3, 4, 5, 32, 33, 67, 68, 70, 71, 72, 73];

/// Whether a port number is on the known-application list.
pub fn is_known(port: u8) -> bool {
    KNOWN_PORTS.contains(&port)
}

/// Human-readable label for a port number.
pub fn label(port: u8) -> String {
    let name = match port {
        1 => "TEXT_MESSAGE",
        3 => "POSITION",
        4 => "NODEINFO",
        5 => "ROUTING",
        32 => "ADMIN",
        33 => "REPLY",
        67 => "TELEMETRY",
        68 => "TRACEROUTE",
        70 => "NEIGHBORINFO",
        71 => "ATAK_FORWARDER",
        72 => "MAP_REPORT",
        73 => "STORE_FORWARD",
        other => return format!("PORT_{}", other),
    };
    name.to_string()
}
