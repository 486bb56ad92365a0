//! Socket.IO v5 packet codec
//!
//! Socket.IO packets travel inside Engine.IO message packets and look like
//! `<type>[<attachments>-][<namespace>,][<ack id>][<json>]`.

use serde_json::Value;

use crate::error::PacketError;

/// Namespace used when a packet carries none
pub const DEFAULT_NAMESPACE: &str = "/";

#[derive(Clone, Debug, PartialEq)]
pub enum SocketPacket {
    Connect {
        namespace: String,
        data: Option<Value>,
    },
    Disconnect {
        namespace: String,
    },
    Event {
        namespace: String,
        id: Option<u64>,
        name: String,
        args: Vec<Value>,
    },
    Ack {
        namespace: String,
        id: u64,
        args: Vec<Value>,
    },
    ConnectError {
        namespace: String,
        data: Option<Value>,
    },
}

impl SocketPacket {
    /// Connect request for a namespace
    pub fn connect(namespace: &str) -> Self {
        Self::Connect {
            namespace: namespace.to_string(),
            data: None,
        }
    }

    pub fn namespace(&self) -> &str {
        match self {
            Self::Connect { namespace, .. }
            | Self::Disconnect { namespace }
            | Self::Event { namespace, .. }
            | Self::Ack { namespace, .. }
            | Self::ConnectError { namespace, .. } => namespace.as_str(),
        }
    }

    pub fn decode(raw: &str) -> Result<Self, PacketError> {
        let mut chars = raw.chars();
        let kind = chars.next().ok_or(PacketError::Empty)?;
        let rest = chars.as_str();

        if matches!(kind, '5' | '6') {
            return Err(PacketError::Unsupported("binary attachments"));
        }

        let (namespace, rest) = split_namespace(rest);
        let (id, rest) = split_ack_id(rest);
        let data = if rest.is_empty() {
            None
        } else {
            Some(serde_json::from_str::<Value>(rest).map_err(PacketError::Payload)?)
        };

        match kind {
            '0' => Ok(Self::Connect { namespace, data }),
            '1' => Ok(Self::Disconnect { namespace }),
            '2' => {
                let mut args = into_args(data);
                if args.is_empty() {
                    return Err(PacketError::MissingEventName);
                }
                let Value::String(name) = args.remove(0) else {
                    return Err(PacketError::MissingEventName);
                };
                Ok(Self::Event {
                    namespace,
                    id,
                    name,
                    args,
                })
            }
            '3' => Ok(Self::Ack {
                namespace,
                id: id.ok_or(PacketError::Unsupported("ack without id"))?,
                args: into_args(data),
            }),
            '4' => Ok(Self::ConnectError { namespace, data }),
            other => Err(PacketError::UnknownType(other)),
        }
    }

    pub fn encode(&self) -> String {
        let mut out = String::new();
        let (kind, namespace) = match self {
            Self::Connect { namespace, .. } => ('0', namespace),
            Self::Disconnect { namespace } => ('1', namespace),
            Self::Event { namespace, .. } => ('2', namespace),
            Self::Ack { namespace, .. } => ('3', namespace),
            Self::ConnectError { namespace, .. } => ('4', namespace),
        };
        out.push(kind);
        if namespace != DEFAULT_NAMESPACE {
            out.push_str(namespace);
            out.push(',');
        }

        match self {
            Self::Connect { data, .. } | Self::ConnectError { data, .. } => {
                if let Some(data) = data {
                    out.push_str(&data.to_string());
                }
            }
            Self::Disconnect { .. } => {}
            Self::Event { id, name, args, .. } => {
                if let Some(id) = id {
                    out.push_str(&id.to_string());
                }
                let mut payload = Vec::with_capacity(args.len() + 1);
                payload.push(Value::String(name.clone()));
                payload.extend(args.iter().cloned());
                out.push_str(&Value::Array(payload).to_string());
            }
            Self::Ack { id, args, .. } => {
                out.push_str(&id.to_string());
                out.push_str(&Value::Array(args.clone()).to_string());
            }
        }

        out
    }
}

fn split_namespace(rest: &str) -> (String, &str) {
    if !rest.starts_with('/') {
        return (DEFAULT_NAMESPACE.to_string(), rest);
    }
    match rest.find(',') {
        Some(comma) => (rest[..comma].to_string(), &rest[comma + 1..]),
        None => (rest.to_string(), ""),
    }
}

fn split_ack_id(rest: &str) -> (Option<u64>, &str) {
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return (None, rest);
    }
    match rest[..digits].parse() {
        Ok(id) => (Some(id), &rest[digits..]),
        Err(_) => (None, rest),
    }
}

fn into_args(data: Option<Value>) -> Vec<Value> {
    match data {
        Some(Value::Array(args)) => args,
        Some(other) => vec![other],
        None => Vec::new(),
    }
}
