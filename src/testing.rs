//! A small SSBP file for driver tests.

#[derive(Default)]
struct Writer {
    data: Vec<u8>,
}

impl Writer {
    fn position(&self) -> u32 {
        u32::try_from(self.data.len()).unwrap()
    }

    fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.data.extend(bytes);
        self
    }

    fn u16(&mut self, value: u16) -> &mut Self {
        self.bytes(&value.to_le_bytes())
    }

    fn i16(&mut self, value: i16) -> &mut Self {
        self.bytes(&value.to_le_bytes())
    }

    fn u32(&mut self, value: u32) -> &mut Self {
        self.bytes(&value.to_le_bytes())
    }

    fn f32(&mut self, value: f32) -> &mut Self {
        self.bytes(&value.to_le_bytes())
    }

    fn string(&mut self, value: &str) -> u32 {
        let offset = self.position();
        self.bytes(value.as_bytes()).bytes(&[0]);
        offset
    }

    fn patch(&mut self, at: usize, bytes: &[u8]) {
        self.data[at..at + bytes.len()].copy_from_slice(bytes);
    }
}

/// One 2x2 cell "body" cut at (1, 1) from "atlas.png", shown by the single part of package
/// "unit" on an 8x8 canvas. Animation "idle" has one frame; "walk" repeats it three times.
pub fn sample() -> Vec<u8> {
    let mut w = Writer {
        data: vec![0; 32],
    };

    let atlas = w.string("atlas");
    let image = w.string("atlas.png");
    let body = w.string("body");
    let unit = w.string("unit");
    let idle = w.string("idle");
    let walk = w.string("walk");
    let empty = w.string("");

    let map = w.position();
    w.u32(atlas).u32(image).i16(0).i16(1);

    let cells = w.position();
    w.u32(body).u32(map).i16(0).i16(1).i16(1).i16(2).i16(2).u16(0);
    w.f32(0.0).f32(0.0);

    let parts = w.position();
    w.u32(body).i16(0).i16(-1).i16(1).i16(0).i16(0).u16(0);
    w.u32(empty).u32(empty).u32(0);

    let initial = w.position();
    w.i16(0).u16(0).u32(0).i16(0).i16(0).i16(0).i16(0).i16(255).u16(0);
    for value in [
        0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 2.0, 2.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0,
    ] {
        w.f32(value);
    }

    let block = w.position();
    w.i16(0).u32(0);
    let frames = w.position();
    w.u32(block).u32(block).u32(block);

    let animations = w.position();
    w.u32(idle).u32(initial).u32(frames).u32(0).u32(0);
    w.u16(1).u16(30).u16(0).u16(8).u16(8).u16(0);
    w.u32(walk).u32(initial).u32(frames).u32(0).u32(0);
    w.u16(3).u16(30).u16(0).u16(8).u16(8).u16(0);

    let packages = w.position();
    w.u32(unit).u32(parts).u32(animations).u16(1).u16(2);

    w.patch(0, &ssbp::de::SIGNATURE.to_le_bytes());
    w.patch(4, &11u32.to_le_bytes());
    w.patch(16, &cells.to_le_bytes());
    w.patch(20, &packages.to_le_bytes());
    w.patch(28, &1u16.to_le_bytes());
    w.patch(30, &1u16.to_le_bytes());
    w.data
}
