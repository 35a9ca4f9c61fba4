//! GeoLite2-City 本地数据库查询

use std::net::IpAddr;

use async_trait::async_trait;
use maxminddb::Reader;
use tracing::trace;

use super::provider::{GeoInfo, GeoIpLookup};

pub struct MaxMindProvider {
    reader: Reader<Vec<u8>>,
}

impl MaxMindProvider {
    pub fn new(path: &str) -> Result<Self, maxminddb::MaxMindDbError> {
        Ok(Self {
            reader: Reader::open_readfile(path)?,
        })
    }

    fn lookup_addr(&self, addr: IpAddr) -> Option<GeoInfo> {
        let record: maxminddb::geoip2::City = self.reader.lookup(addr).ok()?.decode().ok()??;
        Some(GeoInfo {
            country: record.country.iso_code.map(String::from),
            city: record.city.names.english.map(String::from),
        })
    }
}

#[async_trait]
impl GeoIpLookup for MaxMindProvider {
    async fn lookup(&self, ip: &str) -> Option<GeoInfo> {
        let addr: IpAddr = ip.parse().ok()?;
        let info = self.lookup_addr(addr);
        trace!("MaxMind lookup for {}: {:?}", ip, info);
        info
    }

    fn name(&self) -> &'static str {
        "MaxMind"
    }
}
