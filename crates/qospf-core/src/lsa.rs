//! Link-state advertisements and their wire format.
//!
//! Every advertisement starts with the common 20-byte header. Only the
//! router body is interpreted; other bodies keep their raw bytes and are
//! stepped over using the header's length field.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

use crate::error::CoreError;
use crate::metric::EncodedMetric;
use crate::types::{LinkEntry, LinkType, QosKind, QosMetricRecord, RouterId, RouterLsa};

/// First sequence number a router uses for a new advertisement instance.
pub const INITIAL_SEQUENCE_NUMBER: u32 = 0x8000_0001;

const ROUTER_BODY_BASE_LENGTH: usize = 4;
const ROUTER_LINK_BASE_LENGTH: usize = 12;
const QOS_RECORD_LENGTH: usize = 4;

/// Advertisement type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LsaType {
    Router,
    Network,
    SummaryNetwork,
    SummaryRouter,
    AsExternal,
    /// Link-, area- or AS-scoped opaque advertisement (types 9-11).
    Opaque(u8),
    Unknown(u8),
}

impl LsaType {
    pub fn to_u8(self) -> u8 {
        match self {
            LsaType::Router => 1,
            LsaType::Network => 2,
            LsaType::SummaryNetwork => 3,
            LsaType::SummaryRouter => 4,
            LsaType::AsExternal => 5,
            LsaType::Opaque(code) | LsaType::Unknown(code) => code,
        }
    }

    pub fn from_u8(code: u8) -> Self {
        match code {
            1 => LsaType::Router,
            2 => LsaType::Network,
            3 => LsaType::SummaryNetwork,
            4 => LsaType::SummaryRouter,
            5 => LsaType::AsExternal,
            9..=11 => LsaType::Opaque(code),
            other => LsaType::Unknown(other),
        }
    }
}

/// The common advertisement header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LsaHeader {
    pub age: u16,
    pub options: u8,
    pub lsa_type: LsaType,
    pub link_state_id: Ipv4Addr,
    pub advertising_router: RouterId,
    pub sequence_number: u32,
    pub checksum: u16,
    /// Total length of the advertisement including this header.
    pub length: u16,
}

impl LsaHeader {
    pub const LENGTH: usize = 20;

    fn decode(buf: &mut Bytes) -> Result<Self, CoreError> {
        ensure(buf, Self::LENGTH)?;
        let age = buf.get_u16();
        let options = buf.get_u8();
        let lsa_type = LsaType::from_u8(buf.get_u8());
        let link_state_id = Ipv4Addr::from(buf.get_u32());
        let advertising_router = Ipv4Addr::from(buf.get_u32());
        let sequence_number = buf.get_u32();
        let checksum = buf.get_u16();
        let length = buf.get_u16();
        Ok(Self {
            age,
            options,
            lsa_type,
            link_state_id,
            advertising_router,
            sequence_number,
            checksum,
            length,
        })
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u16(self.age);
        buf.put_u8(self.options);
        buf.put_u8(self.lsa_type.to_u8());
        buf.put_u32(u32::from(self.link_state_id));
        buf.put_u32(u32::from(self.advertising_router));
        buf.put_u32(self.sequence_number);
        buf.put_u16(self.checksum);
        buf.put_u16(self.length);
    }
}

/// Router advertisement body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterBody {
    pub flags: u8,
    pub links: Vec<LinkEntry>,
}

/// Advertisement body, one variant per type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LsaBody {
    Router(RouterBody),
    Network(Vec<u8>),
    SummaryNetwork(Vec<u8>),
    SummaryRouter(Vec<u8>),
    AsExternal(Vec<u8>),
    Opaque(Vec<u8>),
    Unknown(Vec<u8>),
}

impl LsaBody {
    fn decode(lsa_type: LsaType, buf: &mut Bytes) -> Result<Self, CoreError> {
        let body = match lsa_type {
            LsaType::Router => LsaBody::Router(decode_router_body(buf)?),
            LsaType::Network => LsaBody::Network(buf.to_vec()),
            LsaType::SummaryNetwork => LsaBody::SummaryNetwork(buf.to_vec()),
            LsaType::SummaryRouter => LsaBody::SummaryRouter(buf.to_vec()),
            LsaType::AsExternal => LsaBody::AsExternal(buf.to_vec()),
            LsaType::Opaque(_) => LsaBody::Opaque(buf.to_vec()),
            LsaType::Unknown(_) => LsaBody::Unknown(buf.to_vec()),
        };
        Ok(body)
    }

    fn encode(&self, buf: &mut BytesMut) {
        match self {
            LsaBody::Router(router) => encode_router_body(router, buf),
            LsaBody::Network(raw)
            | LsaBody::SummaryNetwork(raw)
            | LsaBody::SummaryRouter(raw)
            | LsaBody::AsExternal(raw)
            | LsaBody::Opaque(raw)
            | LsaBody::Unknown(raw) => buf.put_slice(raw),
        }
    }
}

/// A complete advertisement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lsa {
    pub header: LsaHeader,
    pub body: LsaBody,
}

impl Lsa {
    /// Decode one advertisement from the front of `buf`, consuming exactly
    /// the number of bytes named by its header's length field.
    pub fn decode(buf: &mut Bytes) -> Result<Self, CoreError> {
        let header = LsaHeader::decode(buf)?;
        let length = usize::from(header.length);
        if length < LsaHeader::LENGTH {
            return Err(CoreError::Decode(format!(
                "advertisement length {} shorter than its header",
                length
            )));
        }
        let body_length = length - LsaHeader::LENGTH;
        ensure(buf, body_length)?;
        let mut body_buf = buf.split_to(body_length);
        let body = LsaBody::decode(header.lsa_type, &mut body_buf)?;
        Ok(Self { header, body })
    }

    /// Encode this advertisement. The header's length field is rewritten to
    /// match the encoded body.
    pub fn encode(&self) -> Bytes {
        let mut body = BytesMut::new();
        self.body.encode(&mut body);

        let mut header = self.header.clone();
        header.length = (LsaHeader::LENGTH + body.len()) as u16;

        let mut buf = BytesMut::with_capacity(LsaHeader::LENGTH + body.len());
        header.encode(&mut buf);
        buf.put_slice(&body);
        buf.freeze()
    }

    /// The router view of this advertisement, if it is one.
    pub fn router(&self) -> Option<RouterLsa> {
        match &self.body {
            LsaBody::Router(body) => Some(RouterLsa {
                advertising_router: self.header.advertising_router,
                link_state_id: self.header.link_state_id,
                sequence_number: self.header.sequence_number,
                flags: body.flags,
                links: body.links.clone(),
            }),
            _ => None,
        }
    }
}

impl RouterLsa {
    /// Wrap this router advertisement in a full advertisement with a fresh header.
    pub fn to_lsa(&self) -> Lsa {
        Lsa {
            header: LsaHeader {
                age: 0,
                options: 0,
                lsa_type: LsaType::Router,
                link_state_id: self.link_state_id,
                advertising_router: self.advertising_router,
                sequence_number: self.sequence_number,
                checksum: 0,
                length: 0,
            },
            body: LsaBody::Router(RouterBody {
                flags: self.flags,
                links: self.links.clone(),
            }),
        }
    }
}

/// Decode a back-to-back stream of advertisements.
pub fn decode_stream(mut buf: Bytes) -> Result<Vec<Lsa>, CoreError> {
    let mut lsas = Vec::new();
    while buf.has_remaining() {
        lsas.push(Lsa::decode(&mut buf)?);
    }
    Ok(lsas)
}

/// Encode advertisements back to back.
pub fn encode_stream<'a>(lsas: impl IntoIterator<Item = &'a Lsa>) -> Bytes {
    let mut buf = BytesMut::new();
    for lsa in lsas {
        buf.put_slice(&lsa.encode());
    }
    buf.freeze()
}

fn ensure(buf: &Bytes, needed: usize) -> Result<(), CoreError> {
    if buf.remaining() < needed {
        return Err(CoreError::Truncated {
            needed,
            available: buf.remaining(),
        });
    }
    Ok(())
}

fn decode_router_body(buf: &mut Bytes) -> Result<RouterBody, CoreError> {
    ensure(buf, ROUTER_BODY_BASE_LENGTH)?;
    let flags = buf.get_u8();
    let _ = buf.get_u8();
    let link_count = buf.get_u16();

    let mut links = Vec::with_capacity(usize::from(link_count));
    for _ in 0..link_count {
        ensure(buf, ROUTER_LINK_BASE_LENGTH)?;
        let link_id = Ipv4Addr::from(buf.get_u32());
        let link_data = Ipv4Addr::from(buf.get_u32());
        let link_type = LinkType::from_u8(buf.get_u8())?;
        let tos_count = usize::from(buf.get_u8());
        let metric = buf.get_u16();

        ensure(buf, tos_count * QOS_RECORD_LENGTH)?;
        let mut qos = Vec::with_capacity(tos_count);
        for _ in 0..tos_count {
            let tag = buf.get_u8();
            let interface_index = buf.get_u8();
            let bits = buf.get_u16();
            qos.push(QosMetricRecord {
                queue_number: tag >> 5,
                kind: QosKind::from_u8(tag & 0x1F)?,
                interface_index,
                metric: EncodedMetric::from_bits(bits),
            });
        }

        links.push(LinkEntry {
            link_id,
            link_data,
            link_type,
            metric,
            qos,
        });
    }

    if buf.has_remaining() {
        return Err(CoreError::Decode(format!(
            "{} trailing bytes after router links",
            buf.remaining()
        )));
    }

    Ok(RouterBody { flags, links })
}

fn encode_router_body(body: &RouterBody, buf: &mut BytesMut) {
    buf.put_u8(body.flags);
    buf.put_u8(0);
    buf.put_u16(body.links.len() as u16);
    for link in &body.links {
        buf.put_u32(u32::from(link.link_id));
        buf.put_u32(u32::from(link.link_data));
        buf.put_u8(link.link_type.to_u8());
        buf.put_u8(link.qos.len() as u8);
        buf.put_u16(link.metric);
        for record in &link.qos {
            buf.put_u8((record.queue_number << 5) | (record.kind.to_u8() & 0x1F));
            buf.put_u8(record.interface_index);
            buf.put_u16(record.metric.to_bits());
        }
    }
}
