#[allow(dead_code)]
mod common;

use ndarray::{Array2, Array3};

use sips_core::frame::SourceKind;
use sips_core::io::natural::natural_sort;
use sips_core::io::{
    clamp_range, detect_source, list_image_files, load_series, probe, write_npy, LoadRequest,
    LoadTask,
};
use sips_core::pipeline::{NoOpReporter, ProgressCounter};
use sips_core::SipsError;

use common::{constant_tiff_dir, write_temp_file, write_tiff_frames};
#[cfg(feature = "cine")]
use common::{build_cine_with_frames, constant_frames_u8, write_test_cine};

/// `.npy` bytes with the given header dictionary and `data_len` zero bytes of data.
fn npy_bytes(dict: &str, data_len: usize) -> Vec<u8> {
    let mut header = dict.to_string();
    while (10 + header.len() + 1) % 64 != 0 {
        header.push(' ');
    }
    header.push('\n');
    let mut bytes = b"\x93NUMPY\x01\x00".to_vec();
    bytes.extend_from_slice(&(header.len() as u16).to_le_bytes());
    bytes.extend_from_slice(header.as_bytes());
    bytes.resize(bytes.len() + data_len, 0);
    bytes
}

// ---------------------------------------------------------------------------
// Ranges and naming
// ---------------------------------------------------------------------------

#[test]
fn test_natural_sort_orders_numbers() {
    let mut names = vec![
        "frame10.tif".to_string(),
        "frame2.tif".to_string(),
        "frame1.tif".to_string(),
    ];
    natural_sort(&mut names);
    assert_eq!(names, vec!["frame1.tif", "frame2.tif", "frame10.tif"]);
}

#[test]
fn test_natural_sort_is_case_sensitive() {
    let mut names = vec![
        "a1.tif".to_string(),
        "B1.tif".to_string(),
        "a10.tif".to_string(),
        "a2.tif".to_string(),
    ];
    natural_sort(&mut names);
    assert_eq!(names, vec!["B1.tif", "a1.tif", "a2.tif", "a10.tif"]);
}

#[test]
fn test_clamp_range() {
    assert_eq!(clamp_range(0, 3, 10), (0, 3));
    assert_eq!(clamp_range(5, 100, 10), (5, 9));
    assert_eq!(clamp_range(20, 100, 10), (9, 9));
}

#[test]
fn test_detect_missing_source() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nothing.cine");
    assert!(matches!(detect_source(&missing), Err(SipsError::NotFound(_))));
}

#[test]
fn test_detect_unsupported_extension() {
    let file = write_temp_file(b"not a recording", ".txt");
    assert!(matches!(
        detect_source(file.path()),
        Err(SipsError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_ser_recordings_are_unsupported() {
    let file = write_temp_file(b"LUCAM-RECORDER", ".ser");
    assert!(matches!(
        detect_source(file.path()),
        Err(SipsError::UnsupportedFormat(_))
    ));
    let err = load_series::<u8>(&LoadRequest::new(file.path(), 0, 1), &NoOpReporter).unwrap_err();
    assert!(matches!(err, SipsError::UnsupportedFormat(_)));
}

#[test]
fn test_detect_kinds() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(detect_source(dir.path()).unwrap(), SourceKind::ImageDirectory);
    let cine = write_temp_file(b"", ".CINE");
    assert_eq!(detect_source(cine.path()).unwrap(), SourceKind::Cine);
    let npy = write_temp_file(b"", ".npy");
    assert_eq!(detect_source(npy.path()).unwrap(), SourceKind::StoredArray);
}

// ---------------------------------------------------------------------------
// Cine containers
// ---------------------------------------------------------------------------

#[cfg(feature = "cine")]
#[test]
fn test_load_cine_range() {
    let file = write_test_cine(4, 3, &constant_frames_u8(4, 3, 6));
    let counter = ProgressCounter::new();
    let series = load_series::<u8>(&LoadRequest::new(file.path(), 2, 4), &counter).unwrap();

    assert_eq!(series.dim(), (3, 4, 3));
    for (slot, expected) in [2u8, 3, 4].iter().enumerate() {
        assert!(series.frame(slot).iter().all(|v| v == expected));
    }
    assert_eq!(counter.total(), 3);
    assert_eq!(counter.count(), 3);
    assert_eq!(counter.percent(), 100.0);
}

#[cfg(feature = "cine")]
#[test]
fn test_load_cine_end_clamped() {
    let file = write_test_cine(2, 2, &constant_frames_u8(2, 2, 4));
    let series = load_series::<f32>(&LoadRequest::new(file.path(), 1, 100), &NoOpReporter).unwrap();
    assert_eq!(series.frame_count(), 3);
    assert_eq!(series.frame(2)[[0, 0]], 3.0);
}

#[cfg(feature = "cine")]
#[test]
fn test_truncated_cine_rejected() {
    let mut bytes = build_cine_with_frames(4, 4, &constant_frames_u8(4, 4, 2));
    bytes.truncate(bytes.len() - 5);
    let file = write_temp_file(&bytes, ".cine");
    let err = load_series::<u8>(&LoadRequest::new(file.path(), 0, 1), &NoOpReporter).unwrap_err();
    assert!(matches!(err, SipsError::InvalidContainer(_)));
}

#[cfg(feature = "cine")]
#[test]
fn test_cine_offset_past_address_space_rejected() {
    let mut bytes = build_cine_with_frames(2, 2, &constant_frames_u8(2, 2, 2));
    // First entry of the image offset table, right after both headers.
    bytes[84..92].copy_from_slice(&(u64::MAX - 2).to_le_bytes());
    let file = write_temp_file(&bytes, ".cine");
    let err = load_series::<u8>(&LoadRequest::new(file.path(), 0, 1), &NoOpReporter).unwrap_err();
    assert!(matches!(err, SipsError::InvalidContainer(_)));
}

#[cfg(feature = "cine")]
#[test]
fn test_compressed_cine_cannot_be_decoded() {
    let mut bytes = build_cine_with_frames(2, 2, &constant_frames_u8(2, 2, 3));
    // File header compression field: 1 = JPEG.
    bytes[4..6].copy_from_slice(&1u16.to_le_bytes());
    let file = write_temp_file(&bytes, ".cine");
    let request = LoadRequest::new(file.path(), 0, 2);

    let err = load_series::<u16>(&request, &NoOpReporter).unwrap_err();
    assert!(matches!(err, SipsError::DecodingUnavailable(_)));

    let task = LoadTask::<u16>::spawn(request).unwrap();
    assert!(matches!(task.join(), Err(SipsError::DecodingUnavailable(_))));
}

#[cfg(feature = "cine")]
#[test]
fn test_packed_cine_pixels_cannot_be_decoded() {
    let frames = constant_frames_u8(2, 2, 1);

    // 12 bits per pixel in the bitmap header.
    let mut packed = build_cine_with_frames(2, 2, &frames);
    packed[58..60].copy_from_slice(&12u16.to_le_bytes());
    let file = write_temp_file(&packed, ".cine");
    let err = load_series::<u16>(&LoadRequest::new(file.path(), 0, 0), &NoOpReporter).unwrap_err();
    assert!(matches!(err, SipsError::DecodingUnavailable(_)));

    // Non-zero bitmap compression.
    let mut compressed = build_cine_with_frames(2, 2, &frames);
    compressed[60..64].copy_from_slice(&256u32.to_le_bytes());
    let file = write_temp_file(&compressed, ".cine");
    assert!(matches!(
        probe(file.path()),
        Err(SipsError::DecodingUnavailable(_))
    ));
}

#[cfg(feature = "cine")]
#[test]
fn test_load_cine_flips_bottom_up_rows() {
    let frames = vec![vec![0u8, 1, 2, 3, 4, 5], vec![10u8, 11, 12, 13, 14, 15]];
    let file = write_test_cine(3, 2, &frames);
    let series = load_series::<u8>(&LoadRequest::new(file.path(), 0, 10), &NoOpReporter).unwrap();

    assert_eq!(series.dim(), (2, 3, 2));
    let first = series.frame(0);
    assert_eq!(first[[0, 0]], 0);
    assert_eq!(first[[0, 2]], 2);
    assert_eq!(first[[1, 0]], 3);
    assert_eq!(series.frame(1)[[1, 2]], 15);
}

#[cfg(feature = "cine")]
#[test]
fn test_cine_metadata_without_decoding() {
    let file = write_test_cine(3, 2, &vec![vec![0u8; 6]; 4]);
    let info = probe(file.path()).unwrap();
    assert_eq!(info.kind, SourceKind::Cine);
    assert_eq!(info.total_frames, 4);
    assert_eq!((info.width, info.height), (3, 2));
    assert_eq!(info.bit_depth, 8);
}

#[cfg(not(feature = "cine"))]
#[test]
fn test_cine_without_decoder_is_unavailable() {
    let file = write_temp_file(b"CI", ".cine");
    let request = LoadRequest::new(file.path(), 0, 0);

    let err = load_series::<u8>(&request, &NoOpReporter).unwrap_err();
    assert!(matches!(err, SipsError::DecodingUnavailable(_)));
    assert!(matches!(
        probe(file.path()),
        Err(SipsError::DecodingUnavailable(_))
    ));

    let task = LoadTask::<u8>::spawn(request).unwrap();
    assert!(matches!(task.join(), Err(SipsError::DecodingUnavailable(_))));
}

#[test]
fn test_npy_two_dimensional_is_one_frame() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("single.npy");
    let frame = common::ramp(3, 4);
    write_npy(&path, &frame).unwrap();

    let series = load_series::<f32>(&LoadRequest::new(&path, 0, 0), &NoOpReporter).unwrap();
    assert_eq!(series.dim(), (3, 4, 1));
    assert_eq!(series.frame(0), frame);
}

#[test]
fn test_npy_ignores_range() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stack.npy");
    let stack = Array3::<u16>::from_shape_fn((2, 3, 5), |(_, _, k)| k as u16 * 100);
    write_npy(&path, &stack).unwrap();

    let series = load_series::<u16>(&LoadRequest::new(&path, 1, 2), &NoOpReporter).unwrap();
    assert_eq!(series.dim(), (2, 3, 5));
    assert_eq!(series.data(), &stack);
}

#[test]
fn test_npy_shape_larger_than_file_rejected() {
    let bytes = npy_bytes(
        "{'descr': '<f4', 'fortran_order': False, 'shape': (100000, 100000, 100000), }",
        16,
    );
    let file = write_temp_file(&bytes, ".npy");
    let err = load_series::<f32>(&LoadRequest::new(file.path(), 0, 0), &NoOpReporter).unwrap_err();
    assert!(matches!(err, SipsError::InvalidArray(_)));
}

#[test]
fn test_npy_overflowing_shape_rejected() {
    let bytes = npy_bytes(
        "{'descr': '<u2', 'fortran_order': False, 'shape': (18446744073709551615, 2), }",
        8,
    );
    let file = write_temp_file(&bytes, ".npy");
    let err = load_series::<u16>(&LoadRequest::new(file.path(), 0, 0), &NoOpReporter).unwrap_err();
    assert!(matches!(err, SipsError::InvalidArray(_)));
}

#[test]
fn test_npy_header_length_past_end_rejected() {
    let mut bytes = npy_bytes("{'descr': '<u2', 'fortran_order': False, 'shape': (2, 2), }", 8);
    bytes[8..10].copy_from_slice(&u16::MAX.to_le_bytes());
    let file = write_temp_file(&bytes, ".npy");
    assert!(matches!(probe(file.path()), Err(SipsError::InvalidArray(_))));
}

// ---------------------------------------------------------------------------
// Image directories
// ---------------------------------------------------------------------------

#[test]
fn test_image_directory_natural_order() {
    let dir = tempfile::tempdir().unwrap();
    let frames: Vec<Array2<u16>> = [10u16, 2, 1]
        .iter()
        .map(|&v| Array2::from_elem((3, 4), v))
        .collect();
    write_tiff_frames(dir.path(), &["f10.tif", "f2.tif", "f1.tif"], &frames);
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let files = list_image_files(dir.path(), None).unwrap();
    assert_eq!(files.len(), 3);

    let series = load_series::<u16>(&LoadRequest::new(dir.path(), 0, 10), &NoOpReporter).unwrap();
    assert_eq!(series.dim(), (3, 4, 3));
    assert_eq!(series.frame(0)[[0, 0]], 1);
    assert_eq!(series.frame(1)[[0, 0]], 2);
    assert_eq!(series.frame(2)[[0, 0]], 10);
}

#[test]
fn test_image_directory_extension_filter() {
    let dir = tempfile::tempdir().unwrap();
    let frame = Array2::from_elem((2, 2), 7u16);
    write_tiff_frames(dir.path(), &["a.TIFF", "b.tif"], &[frame.clone(), frame]);

    let request = LoadRequest::new(dir.path(), 0, 10).with_extension(".tiff");
    let series = load_series::<u16>(&request, &NoOpReporter).unwrap();
    assert_eq!(series.frame_count(), 1);
}

#[test]
fn test_image_directory_empty() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_series::<u16>(&LoadRequest::new(dir.path(), 0, 10), &NoOpReporter).unwrap_err();
    assert!(matches!(err, SipsError::EmptySequence));
}

#[test]
fn test_image_directory_shape_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    write_tiff_frames(
        dir.path(),
        &["1.tif", "2.tif"],
        &[Array2::zeros((3, 4)), Array2::zeros((4, 4))],
    );
    let err = load_series::<u16>(&LoadRequest::new(dir.path(), 0, 10), &NoOpReporter).unwrap_err();
    assert!(matches!(err, SipsError::ShapeMismatch { .. }));
}

// ---------------------------------------------------------------------------
// Background loading
// ---------------------------------------------------------------------------

#[test]
fn test_load_task_reports_progress() {
    let dir = constant_tiff_dir(8, 8, 10);
    let task = LoadTask::<f32>::spawn(LoadRequest::new(dir.path(), 0, 9)).unwrap();
    let progress = task.progress();
    let series = task.join().unwrap();

    assert_eq!(series.frame_count(), 10);
    assert_eq!(series.frame(9)[[0, 0]], 9.0);
    assert_eq!(progress.count(), 10);
    assert_eq!(progress.total(), 10);
}

#[test]
fn test_load_task_propagates_errors() {
    let dir = tempfile::tempdir().unwrap();
    let task = LoadTask::<u8>::spawn(LoadRequest::new(dir.path().join("gone.cine"), 0, 1)).unwrap();
    assert!(matches!(task.join(), Err(SipsError::NotFound(_))));
}
