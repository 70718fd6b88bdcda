// SPDX-License-Identifier: MPL-2.0

//! Integer compositing math shared by the stages
//!
//! All functions work on 8-bit channels and round to nearest.

/// `x * y / 255`, rounded
#[inline]
pub fn mul_div255(x: u32, y: u32) -> u32 {
    (x * y + 127) / 255
}

/// Opacity in [0, 1] as an 8-bit alpha
#[inline]
pub fn alpha_u8(opacity: f32) -> u8 {
    (opacity.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Light-mix keyed on the layer value
///
/// Layers at or below mid-gray multiply, brighter layers screen:
/// `2*b*l/255` or `255 - 2*(255-b)*(255-l)/255`.
#[inline]
pub fn light_mix(base: u8, layer: u8) -> u8 {
    let b = u32::from(base);
    let l = u32::from(layer);
    let out = if l <= 128 {
        mul_div255(2 * b, l)
    } else {
        255 - mul_div255(2 * (255 - b), 255 - l).min(255)
    };
    out.min(255) as u8
}

/// Overlay blend: the light-mix keyed on the base value instead of the layer
#[inline]
pub fn overlay(base: u8, layer: u8) -> u8 {
    light_mix(layer, base)
}

/// Mix `blended` over `base` with the given alpha
#[inline]
pub fn mix(base: u8, blended: u8, alpha: u8) -> u8 {
    let a = u32::from(alpha);
    let out = mul_div255(u32::from(base), 255 - a) + mul_div255(u32::from(blended), a);
    out.min(255) as u8
}

/// Multiply by black at the given alpha
#[inline]
pub fn darken(base: u8, alpha: u8) -> u8 {
    mul_div255(u32::from(base), 255 - u32::from(alpha)) as u8
}
