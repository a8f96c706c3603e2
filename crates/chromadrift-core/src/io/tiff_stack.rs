use std::fs::File;
use std::io::{BufReader, BufWriter, Seek, Write};
use std::path::Path;

use ndarray::{ArrayD, ArrayViewD, IxDyn};
use num_traits::{NumCast, ToPrimitive};
use serde::{Deserialize, Serialize};
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::encoder::{colortype, TiffEncoder, TiffValue};
use tiff::tags::Tag;
use tiff::ColorType;

use crate::error::{ChromaDriftError, Result};
use crate::volume::PixelType;

/// JSON shape record stored in the ImageDescription tag of the first page.
#[derive(Debug, Serialize, Deserialize)]
struct ShapeDescription {
    shape: Vec<usize>,
}

/// Summary of a TIFF stack without decoding its pixels.
#[derive(Clone, Debug)]
pub struct StackInfo {
    pub pages: usize,
    pub width: u32,
    pub height: u32,
    pub color_type: String,
    pub shape: Option<Vec<usize>>,
}

/// Read page headers only.
pub fn read_info(path: &Path) -> Result<StackInfo> {
    let mut decoder = open_decoder(path)?;
    let shape = read_shape_description(&mut decoder);
    let (width, height) = decoder.dimensions()?;
    let color_type = format!("{:?}", decoder.colortype()?);

    let mut pages = 1;
    while decoder.more_images() {
        decoder.next_image()?;
        pages += 1;
    }

    Ok(StackInfo {
        pages,
        width,
        height,
        color_type,
        shape,
    })
}

/// Read a grayscale TIFF into an N-dimensional array.
///
/// Pages are the trailing (rows, cols) planes in C order. The full shape comes
/// from a JSON `{"shape": [...]}` description on the first page when present;
/// otherwise a single page reads as 2D and several pages as (pages, rows, cols).
pub fn read_array(path: &Path) -> Result<(ArrayD<f64>, PixelType)> {
    let mut decoder = open_decoder(path)?;
    let described = read_shape_description(&mut decoder);
    let (width, height) = decoder.dimensions()?;

    let mut samples: Vec<f64> = Vec::new();
    let mut dtype: Option<PixelType> = None;
    let mut pages = 0usize;

    loop {
        match decoder.colortype()? {
            ColorType::Gray(_) => {}
            other => {
                return Err(ChromaDriftError::UnsupportedPixelType(format!(
                    "{}: only single-sample grayscale pages are supported, got {:?}",
                    path.display(),
                    other
                )))
            }
        }
        if decoder.dimensions()? != (width, height) {
            return Err(ChromaDriftError::Shape(format!(
                "{}: page {} is {:?}, first page is {:?}",
                path.display(),
                pages,
                decoder.dimensions()?,
                (width, height)
            )));
        }

        let page_type = decode_page(decoder.read_image()?, &mut samples)?;
        match dtype {
            Some(t) if t != page_type => {
                return Err(ChromaDriftError::UnsupportedPixelType(format!(
                    "{}: mixed page types {} and {}",
                    path.display(),
                    t,
                    page_type
                )))
            }
            _ => dtype = Some(page_type),
        }
        pages += 1;

        if !decoder.more_images() {
            break;
        }
        decoder.next_image()?;
    }

    let (h, w) = (height as usize, width as usize);
    let shape = match described {
        Some(shape) if shape.iter().product::<usize>() == samples.len() => shape,
        _ if pages == 1 => vec![h, w],
        _ => vec![pages, h, w],
    };

    let array = ArrayD::from_shape_vec(IxDyn(&shape), samples)
        .map_err(|e| ChromaDriftError::Shape(format!("{}: {}", path.display(), e)))?;
    // `dtype` is always set: the loop decodes at least one page.
    Ok((array, dtype.unwrap_or(PixelType::U8)))
}

/// Write an N-dimensional array (rank >= 2) as a multi-page grayscale TIFF.
///
/// Samples are cast to `dtype` before encoding.
pub fn write_array(path: &Path, array: &ArrayViewD<f64>, dtype: PixelType) -> Result<()> {
    let shape = array.shape().to_vec();
    if shape.len() < 2 {
        return Err(ChromaDriftError::Shape(format!(
            "cannot write an array of shape {:?} as TIFF pages",
            shape
        )));
    }
    if array.is_empty() {
        return Err(ChromaDriftError::Shape(format!(
            "cannot write an empty array of shape {:?}",
            shape
        )));
    }
    let h = shape[shape.len() - 2];
    let w = shape[shape.len() - 1];
    let plane_len = h * w;

    let samples: Vec<f64> = array.iter().map(|&v| dtype.cast(v)).collect();
    let description = serde_json::to_string(&ShapeDescription { shape })?;

    let file = File::create(path)?;
    let mut encoder = TiffEncoder::new(BufWriter::new(file))?;

    for (page, plane) in samples.chunks(plane_len.max(1)).enumerate() {
        let desc = (page == 0).then_some(description.as_str());
        match dtype {
            PixelType::U8 => write_page::<_, colortype::Gray8>(&mut encoder, w, h, &convert(plane), desc)?,
            PixelType::U16 => write_page::<_, colortype::Gray16>(&mut encoder, w, h, &convert(plane), desc)?,
            PixelType::U32 => write_page::<_, colortype::Gray32>(&mut encoder, w, h, &convert(plane), desc)?,
            PixelType::I8 => write_page::<_, colortype::GrayI8>(&mut encoder, w, h, &convert(plane), desc)?,
            PixelType::I16 => write_page::<_, colortype::GrayI16>(&mut encoder, w, h, &convert(plane), desc)?,
            PixelType::I32 => write_page::<_, colortype::GrayI32>(&mut encoder, w, h, &convert(plane), desc)?,
            PixelType::F32 => write_page::<_, colortype::Gray32Float>(&mut encoder, w, h, &convert(plane), desc)?,
            PixelType::F64 => write_page::<_, colortype::Gray64Float>(&mut encoder, w, h, plane, desc)?,
        }
    }

    Ok(())
}

fn open_decoder(path: &Path) -> Result<Decoder<BufReader<File>>> {
    if !path.exists() {
        return Err(ChromaDriftError::MissingFile(path.to_path_buf()));
    }
    let reader = BufReader::new(File::open(path)?);
    Ok(Decoder::new(reader)?.with_limits(Limits::unlimited()))
}

fn read_shape_description(decoder: &mut Decoder<BufReader<File>>) -> Option<Vec<usize>> {
    let text = decoder.get_tag_ascii_string(Tag::ImageDescription).ok()?;
    serde_json::from_str::<ShapeDescription>(text.trim_end_matches('\0'))
        .ok()
        .map(|d| d.shape)
}

fn decode_page(page: DecodingResult, out: &mut Vec<f64>) -> Result<PixelType> {
    let dtype = match page {
        DecodingResult::U8(v) => extend(out, v, PixelType::U8),
        DecodingResult::U16(v) => extend(out, v, PixelType::U16),
        DecodingResult::U32(v) => extend(out, v, PixelType::U32),
        DecodingResult::I8(v) => extend(out, v, PixelType::I8),
        DecodingResult::I16(v) => extend(out, v, PixelType::I16),
        DecodingResult::I32(v) => extend(out, v, PixelType::I32),
        DecodingResult::F32(v) => extend(out, v, PixelType::F32),
        DecodingResult::F64(v) => extend(out, v, PixelType::F64),
        _ => {
            return Err(ChromaDriftError::UnsupportedPixelType(
                "64-bit integer TIFF samples".into(),
            ))
        }
    };
    Ok(dtype)
}

fn extend<T: ToPrimitive>(out: &mut Vec<f64>, data: Vec<T>, dtype: PixelType) -> PixelType {
    out.extend(data.into_iter().map(|v| v.to_f64().unwrap_or(0.0)));
    dtype
}

fn convert<T: NumCast + Default>(plane: &[f64]) -> Vec<T> {
    plane
        .iter()
        .map(|&v| NumCast::from(v).unwrap_or_default())
        .collect()
}

fn write_page<W, C>(
    encoder: &mut TiffEncoder<W>,
    width: usize,
    height: usize,
    data: &[C::Inner],
    description: Option<&str>,
) -> Result<()>
where
    W: Write + Seek,
    C: colortype::ColorType,
    [C::Inner]: TiffValue,
{
    let mut image = encoder.new_image::<C>(width as u32, height as u32)?;
    if let Some(desc) = description {
        image.encoder().write_tag(Tag::ImageDescription, desc)?;
    }
    image.write_data(data)?;
    Ok(())
}
