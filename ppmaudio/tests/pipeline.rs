use std::f64::consts::PI;
use std::io::Cursor;

use ppmaudio::codec::AdpcmDecoder;
use ppmaudio::core::audio::{AudioSpec, PcmBuffer};
use ppmaudio::core::errors::{Error, FormatErrorKind};
use ppmaudio::ppm::{align4, Track, FIXED_HEADER_SIZE};
use ppmaudio::{decode_track, encode_pcm};

fn sine(amplitude: f64, freq: f64, len: usize) -> Vec<i16> {
    let rate = f64::from(AudioSpec::PPM.sample_rate);
    (0..len)
        .map(|n| (amplitude * (2.0 * PI * freq * n as f64 / rate).sin()).round() as i16)
        .collect()
}

/// Builds a minimal container around the given track data.
fn build_ppm(tracks: [&[u8]; 4]) -> Vec<u8> {
    let anim_size = 0x180u32;
    let stored_frame_count = 6u16;

    let mut buf = vec![0u8; FIXED_HEADER_SIZE as usize];
    buf[0..4].copy_from_slice(b"PARA");
    buf[4..8].copy_from_slice(&anim_size.to_le_bytes());
    let sound_size: u32 = tracks.iter().map(|t| t.len() as u32).sum();
    buf[8..12].copy_from_slice(&sound_size.to_le_bytes());
    buf[12..14].copy_from_slice(&stored_frame_count.to_le_bytes());

    buf.resize(buf.len() + anim_size as usize + usize::from(stored_frame_count) + 1, 0x5a);
    buf.resize(align4(buf.len() as u64) as usize, 0);

    for track in tracks.iter() {
        buf.extend_from_slice(&(track.len() as u32).to_le_bytes());
    }
    buf.resize(buf.len() + 16, 0);

    for track in tracks.iter() {
        buf.extend_from_slice(track);
    }
    buf
}

#[test]
fn verify_decode_track() {
    let spec = AudioSpec::PPM;

    let bgm = encode_pcm(&PcmBuffer::new(spec, sine(6000.0, 200.0, 2048))).unwrap();
    let se2 = encode_pcm(&PcmBuffer::new(spec, sine(3000.0, 600.0, 513))).unwrap();
    assert_eq!(se2.len(), 257);

    let ppm = build_ppm([&bgm[..], &[], &se2[..], &[]]);

    for (track, data) in [(Track::Bgm, &bgm), (Track::Se2, &se2)] {
        let buf = decode_track(Cursor::new(&ppm), track, &spec).unwrap();

        let mut decoder = AdpcmDecoder::try_new(&spec).unwrap();
        assert_eq!(buf.spec(), &spec);
        assert_eq!(buf.samples(), decoder.decode(data).as_slice());
        assert_eq!(buf.samples().len(), 2 * data.len());
    }

    // Empty tracks decode to empty buffers.
    let buf = decode_track(Cursor::new(&ppm), Track::Se1, &spec).unwrap();
    assert!(buf.is_empty());
}

#[test]
fn verify_decode_track_errors() {
    let spec = AudioSpec::PPM;

    let mut ppm = build_ppm([&[0x77; 8], &[], &[], &[]]);
    ppm[0..4].copy_from_slice(b"PARB");

    match decode_track(Cursor::new(&ppm), Track::Bgm, &spec) {
        Err(Error::FormatError(FormatErrorKind::BadMagic)) => (),
        r => panic!("unexpected result {:?}", r),
    }

    match decode_track(Cursor::new(&ppm), Track::Bgm, &AudioSpec::new(2, 8192, 16)) {
        Err(Error::Unsupported(_)) => (),
        r => panic!("unexpected result {:?}", r),
    }
}

#[test]
fn verify_encode_rejects_stereo() {
    let buf = PcmBuffer::new(AudioSpec::new(2, 8192, 16), vec![0; 16]);

    match encode_pcm(&buf) {
        Err(Error::Unsupported(_)) => (),
        r => panic!("unexpected result {:?}", r),
    }
}

#[cfg(feature = "wav")]
#[test]
fn verify_wav_round_trip() {
    use ppmaudio::wav::{read_pcm, write_pcm};

    let spec = AudioSpec::PPM;
    let se3 = encode_pcm(&PcmBuffer::new(spec, sine(5000.0, 300.0, 1000))).unwrap();
    let ppm = build_ppm([&[], &[], &[], &se3[..]]);

    let decoded = decode_track(Cursor::new(&ppm), Track::Se3, &spec).unwrap();

    let mut wav = Cursor::new(Vec::new());
    write_pcm(&mut wav, &decoded).unwrap();

    let read = read_pcm(Cursor::new(wav.into_inner()), &spec).unwrap();
    assert_eq!(read, decoded);

    // Re-encoding the decoded samples reproduces the same number of bytes.
    assert_eq!(encode_pcm(&read).unwrap().len(), 500);
}
