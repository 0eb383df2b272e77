#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(ssbp) = ssbp::de::Ssbp::from_bytes_lenient(data) {
        for package in ssbp.packages() {
            for animation in package.animations() {
                _ = ssbp.resolve(package.name(), animation.name(), 0);
            }
        }
    }
});
