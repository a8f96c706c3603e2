#[allow(dead_code)]
mod common;

use ndarray::{Array2, ArrayD, IxDyn};
use tempfile::TempDir;

use chromadrift_core::error::ChromaDriftError;
use chromadrift_core::io::image_io::{is_tiff, load_array};
use chromadrift_core::io::naming::{group_name, output_path, suffixed_name};
use chromadrift_core::io::tiff_stack::{read_array, read_info, write_array};
use chromadrift_core::volume::PixelType;

use common::pattern_plane;

fn ramp(shape: &[usize]) -> ArrayD<f64> {
    let len: usize = shape.iter().product();
    ArrayD::from_shape_vec(IxDyn(shape), (0..len).map(|i| (i % 251) as f64).collect()).unwrap()
}

#[test]
fn test_tiff_keeps_four_dimensional_shape() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stack.tif");
    let array = ramp(&[2, 3, 5, 4]);

    write_array(&path, &array.view(), PixelType::U16).unwrap();
    let (read, dtype) = read_array(&path).unwrap();

    assert_eq!(dtype, PixelType::U16);
    assert_eq!(read.shape(), &[2, 3, 5, 4]);
    assert_eq!(read, array);

    let info = read_info(&path).unwrap();
    assert_eq!(info.pages, 6);
    assert_eq!((info.width, info.height), (4, 5));
    assert_eq!(info.shape, Some(vec![2, 3, 5, 4]));
}

#[test]
fn test_tiff_plane_reads_back_as_two_dimensions() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plane.tif");
    let plane = pattern_plane(7, 9).into_dyn();

    write_array(&path, &plane.view(), PixelType::U8).unwrap();
    let (read, dtype) = read_array(&path).unwrap();
    assert_eq!(dtype, PixelType::U8);
    assert_eq!(read.shape(), &[7, 9]);
}

#[test]
fn test_tiff_casts_on_write() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cast.tif");
    let data = Array2::from_shape_vec((1, 4), vec![-3.0, 2.5, 3.5, 70000.0]).unwrap().into_dyn();

    write_array(&path, &data.view(), PixelType::U16).unwrap();
    let (read, _) = read_array(&path).unwrap();
    assert_eq!(read.iter().copied().collect::<Vec<_>>(), vec![0.0, 2.0, 4.0, 65535.0]);
}

#[test]
fn test_tiff_signed_and_float_types() {
    let dir = TempDir::new().unwrap();
    for dtype in [PixelType::I16, PixelType::F32, PixelType::F64] {
        let path = dir.path().join(format!("{dtype}.tif"));
        let data = Array2::from_shape_vec((2, 2), vec![-1.0, 0.0, 1.5, 2.0]).unwrap().into_dyn();
        write_array(&path, &data.view(), dtype).unwrap();
        let (_, read_type) = read_array(&path).unwrap();
        assert_eq!(read_type, dtype);
    }
}

#[test]
fn test_tiff_rejects_rank_one() {
    let dir = TempDir::new().unwrap();
    let data = ArrayD::<f64>::zeros(IxDyn(&[5]));
    assert!(matches!(
        write_array(&dir.path().join("x.tif"), &data.view(), PixelType::U8),
        Err(ChromaDriftError::Shape(_))
    ));
}

#[test]
fn test_tiff_rejects_empty_array() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.tif");
    for shape in [&[0usize, 4, 4][..], &[3, 0, 4][..]] {
        let data = ArrayD::<f64>::zeros(IxDyn(shape));
        assert!(matches!(
            write_array(&path, &data.view(), PixelType::U16),
            Err(ChromaDriftError::Shape(_))
        ));
    }
    assert!(!path.exists());
}

#[test]
fn test_read_missing_file() {
    assert!(matches!(
        read_array(std::path::Path::new("/nonexistent/stack.tif")),
        Err(ChromaDriftError::MissingFile(_))
    ));
}

#[test]
fn test_load_array_dispatches_on_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plane.TIFF");
    write_array(&path, &ramp(&[3, 3, 3]).view(), PixelType::U8).unwrap();
    assert!(is_tiff(&path));

    let (array, _) = load_array(&path).unwrap();
    assert_eq!(array.shape(), &[3, 3, 3]);
}

#[test]
fn test_output_naming() {
    let input = std::path::Path::new("/in/cell_488.tif");
    assert_eq!(suffixed_name(input, "_aligned").to_str(), Some("cell_488_aligned.tif"));
    assert_eq!(
        output_path(std::path::Path::new("/out"), input, "_x"),
        std::path::PathBuf::from("/out/cell_488_x.tif")
    );
    assert_eq!(group_name("FOV1", "7"), "FOV1_t007");
}
