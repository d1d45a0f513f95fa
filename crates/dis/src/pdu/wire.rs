//! Big-endian field writer/reader for fixed PDU layouts, on top of
//! `bytes::{Buf, BufMut}`.

use bytes::{Buf, BufMut};
use glam::{DVec3, Vec3};

use crate::entity::EntityTypeCode;
use crate::error::DecodingError;
use crate::identity::EntityId;

use super::time::ClockTime;

pub(crate) struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn u8(&mut self, v: u8) {
        self.buf.put_u8(v);
    }

    pub fn u16(&mut self, v: u16) {
        self.buf.put_u16(v);
    }

    pub fn u32(&mut self, v: u32) {
        self.buf.put_u32(v);
    }

    pub fn i32(&mut self, v: i32) {
        self.buf.put_i32(v);
    }

    pub fn u64(&mut self, v: u64) {
        self.buf.put_u64(v);
    }

    pub fn f32(&mut self, v: f32) {
        self.buf.put_f32(v);
    }

    pub fn f64(&mut self, v: f64) {
        self.buf.put_f64(v);
    }

    pub fn zeros(&mut self, n: usize) {
        self.buf.put_bytes(0, n);
    }

    pub fn bytes(&mut self, v: &[u8]) {
        self.buf.put_slice(v);
    }

    pub fn vec3(&mut self, v: Vec3) {
        self.f32(v.x);
        self.f32(v.y);
        self.f32(v.z);
    }

    pub fn dvec3(&mut self, v: DVec3) {
        self.f64(v.x);
        self.f64(v.y);
        self.f64(v.z);
    }

    pub fn entity_id(&mut self, id: &EntityId) {
        self.u16(id.site);
        self.u16(id.application);
        self.u16(id.entity);
    }

    pub fn entity_type(&mut self, code: &EntityTypeCode) {
        self.u8(code.kind);
        self.u8(code.domain);
        self.u16(code.country);
        self.u8(code.category);
        self.u8(code.subcategory);
        self.u8(code.specific);
        self.u8(code.extra);
    }

    pub fn clock_time(&mut self, time: &ClockTime) {
        self.i32(time.hour);
        self.u32(time.time_past_hour);
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Every read checks `remaining()` first, so short input becomes
/// [`DecodingError::Truncated`] instead of a `Buf` panic.
pub(crate) struct WireReader<'a> {
    buf: &'a [u8],
    len: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            len: buf.len(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    fn ensure(&self, n: usize) -> Result<(), DecodingError> {
        if self.buf.remaining() < n {
            return Err(DecodingError::Truncated {
                expected: self.len - self.buf.remaining() + n,
                actual: self.len,
            });
        }
        Ok(())
    }

    pub fn take(&mut self, n: usize) -> Result<&'a [u8], DecodingError> {
        self.ensure(n)?;
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    pub fn u8(&mut self) -> Result<u8, DecodingError> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    pub fn u16(&mut self) -> Result<u16, DecodingError> {
        self.ensure(2)?;
        Ok(self.buf.get_u16())
    }

    pub fn u32(&mut self) -> Result<u32, DecodingError> {
        self.ensure(4)?;
        Ok(self.buf.get_u32())
    }

    pub fn i32(&mut self) -> Result<i32, DecodingError> {
        self.ensure(4)?;
        Ok(self.buf.get_i32())
    }

    pub fn u64(&mut self) -> Result<u64, DecodingError> {
        self.ensure(8)?;
        Ok(self.buf.get_u64())
    }

    pub fn f32(&mut self) -> Result<f32, DecodingError> {
        self.ensure(4)?;
        Ok(self.buf.get_f32())
    }

    pub fn f64(&mut self) -> Result<f64, DecodingError> {
        self.ensure(8)?;
        Ok(self.buf.get_f64())
    }

    pub fn skip(&mut self, n: usize) -> Result<(), DecodingError> {
        self.ensure(n)?;
        self.buf.advance(n);
        Ok(())
    }

    pub fn vec3(&mut self) -> Result<Vec3, DecodingError> {
        Ok(Vec3::new(self.f32()?, self.f32()?, self.f32()?))
    }

    pub fn dvec3(&mut self) -> Result<DVec3, DecodingError> {
        Ok(DVec3::new(self.f64()?, self.f64()?, self.f64()?))
    }

    pub fn entity_id(&mut self) -> Result<EntityId, DecodingError> {
        Ok(EntityId::new(self.u16()?, self.u16()?, self.u16()?))
    }

    pub fn entity_type(&mut self) -> Result<EntityTypeCode, DecodingError> {
        Ok(EntityTypeCode {
            kind: self.u8()?,
            domain: self.u8()?,
            country: self.u16()?,
            category: self.u8()?,
            subcategory: self.u8()?,
            specific: self.u8()?,
            extra: self.u8()?,
        })
    }

    pub fn clock_time(&mut self) -> Result<ClockTime, DecodingError> {
        Ok(ClockTime {
            hour: self.i32()?,
            time_past_hour: self.u32()?,
        })
    }

    pub fn rest(&mut self) -> &'a [u8] {
        std::mem::take(&mut self.buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn big_endian_layout() {
        let mut w = WireWriter::with_capacity(16);
        w.u8(0xAB);
        w.u16(0x0102);
        w.u32(0x0304_0506);
        w.f32(1.0);
        assert_eq!(
            w.finish(),
            vec![0xAB, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x3F, 0x80, 0x00, 0x00]
        );
    }

    #[test]
    fn reader_reports_truncation() {
        let data = [0u8, 1, 2];
        let mut r = WireReader::new(&data);
        assert_eq!(r.u16().unwrap(), 1);
        assert_eq!(
            r.u32(),
            Err(DecodingError::Truncated {
                expected: 6,
                actual: 3
            })
        );
    }

    #[test]
    fn truncated_skip_and_take() {
        let data = [0u8; 10];
        let mut r = WireReader::new(&data);
        r.skip(4).unwrap();
        assert_eq!(
            r.take(8),
            Err(DecodingError::Truncated {
                expected: 12,
                actual: 10
            })
        );
        assert_eq!(r.remaining(), 6);
        assert_eq!(r.f64().unwrap_err(), DecodingError::Truncated { expected: 12, actual: 10 });
    }

    #[test]
    fn rest_consumes_remaining() {
        let data = [1u8, 2, 3, 4, 5];
        let mut r = WireReader::new(&data);
        r.skip(2).unwrap();
        assert_eq!(r.rest(), &[3, 4, 5]);
        assert_eq!(r.remaining(), 0);
    }
}
