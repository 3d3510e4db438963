//! Service identification based on well-known port numbers.
//!
//! This is a static lookup only; no traffic is exchanged with the service.

use crate::types::Port;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Name reported for ports missing from the table.
pub const UNKNOWN_SERVICE: &str = "Unknown";

static PORT_SERVICES: LazyLock<HashMap<u16, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        (20, "FTP-Data"),
        (21, "FTP"),
        (22, "SSH"),
        (23, "Telnet"),
        (25, "SMTP"),
        (53, "DNS"),
        (67, "DHCP"),
        (69, "TFTP"),
        (80, "HTTP"),
        (88, "Kerberos"),
        (110, "POP3"),
        (111, "RPCBind"),
        (119, "NNTP"),
        (123, "NTP"),
        (135, "MSRPC"),
        (139, "NetBIOS"),
        (143, "IMAP"),
        (161, "SNMP"),
        (179, "BGP"),
        (389, "LDAP"),
        (443, "HTTPS"),
        (445, "SMB"),
        (465, "SMTPS"),
        (514, "Syslog"),
        (587, "Submission"),
        (631, "IPP"),
        (636, "LDAPS"),
        (873, "Rsync"),
        (993, "IMAPS"),
        (995, "POP3S"),
        (1080, "SOCKS"),
        (1194, "OpenVPN"),
        (1433, "MSSQL"),
        (1521, "Oracle"),
        (1723, "PPTP"),
        (1883, "MQTT"),
        (2049, "NFS"),
        (2181, "ZooKeeper"),
        (2375, "Docker"),
        (3000, "Grafana"),
        (3128, "Squid"),
        (3306, "MySQL"),
        (3389, "RDP"),
        (5060, "SIP"),
        (5432, "PostgreSQL"),
        (5672, "AMQP"),
        (5900, "VNC"),
        (6379, "Redis"),
        (6443, "Kubernetes-API"),
        (8080, "HTTP-Proxy"),
        (8443, "HTTPS-Alt"),
        (9090, "Prometheus"),
        (9092, "Kafka"),
        (9200, "Elasticsearch"),
        (11211, "Memcached"),
        (27017, "MongoDB"),
    ])
});

/// Static mapping from well-known port to service name.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceTable;

impl ServiceTable {
    /// Look up the service for a port, `None` on a miss.
    pub fn get(port: Port) -> Option<&'static str> {
        PORT_SERVICES.get(&port.as_u16()).copied()
    }

    /// Look up the service for a port, falling back to [`UNKNOWN_SERVICE`].
    pub fn lookup(port: Port) -> &'static str {
        Self::get(port).unwrap_or(UNKNOWN_SERVICE)
    }
}
